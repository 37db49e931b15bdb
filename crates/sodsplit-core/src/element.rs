//! Source element definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind of element recognized in the monolithic source.
///
/// The first nine kinds are produced by the extractor; `Declaration`
/// is synthesized later for function prototypes placed in headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Function,
    Struct,
    Enum,
    Typedef,
    Global,
    Macro,
    Conditional,
    Include,
    Comment,
    Declaration,
}

impl ElementKind {
    /// Stable lowercase label, used in reports and statistics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Function => "function",
            ElementKind::Struct => "struct",
            ElementKind::Enum => "enum",
            ElementKind::Typedef => "typedef",
            ElementKind::Global => "global",
            ElementKind::Macro => "macro",
            ElementKind::Conditional => "conditional",
            ElementKind::Include => "include",
            ElementKind::Comment => "comment",
            ElementKind::Declaration => "declaration",
        }
    }

    /// Whether ranges of `self` and `other` may legitimately share bytes.
    ///
    /// Each extraction rule scans the whole source, so one byte range can
    /// be claimed twice: a conditional block encloses whatever code it
    /// guards, comments overlap the code they annotate, and function
    /// bodies enclose local initializers, defines and includes that the
    /// leaf scans also pick up. Offsets order elements; they never prove
    /// exclusivity.
    pub fn may_overlap(self, other: ElementKind) -> bool {
        use ElementKind::*;
        match (self, other) {
            (Conditional, _) | (_, Conditional) => true,
            (Comment, _) | (_, Comment) => true,
            (Function, Global | Macro | Include) | (Global | Macro | Include, Function) => true,
            (Declaration, Function) | (Function, Declaration) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discrete unit of source code extracted from the amalgamation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Symbol name, or a synthetic tag for unnamed elements
    pub name: String,
    /// Element kind
    pub kind: ElementKind,
    /// Verbatim source text
    pub content: String,
    /// Byte offset of the first byte in the original source
    pub start: usize,
    /// Byte offset one past the last byte in the original source
    pub end: usize,
    /// Free identifiers referenced by the content
    pub deps: BTreeSet<String>,
}

impl Element {
    /// Construct an element with an empty dependency set; extraction
    /// fills `deps` once the content has been scanned.
    pub fn new(
        name: impl Into<String>,
        kind: ElementKind,
        content: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            content: content.into(),
            start,
            end,
            deps: BTreeSet::new(),
        }
    }
}
