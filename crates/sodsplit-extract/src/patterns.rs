//! Compiled pattern set for recognizing C elements
//!
//! Every pass over the amalgamation shares one `ElementPatterns` instance so
//! the expressions are compiled exactly once. Regexes only locate the anchor
//! of an element; spans that a regex cannot express (function bodies, nested
//! conditionals, line continuations) are completed by hand in the passes.

use regex::Regex;

/// Regular expressions for the C constructs the extractor recognizes.
pub struct ElementPatterns {
    /// Function definition, anchored at its opening brace.
    pub function: Regex,
    /// Function prototype ending in a semicolon.
    pub prototype: Regex,
    /// `typedef struct {...} name;` or `struct name {...};`.
    pub struct_def: Regex,
    /// `typedef enum {...} name;` block including the trailing name.
    pub enum_def: Regex,
    /// Global variable definition with an initializer.
    pub global: Regex,
    /// Simple `typedef <src> <name>;` alias.
    pub typedef: Regex,
    /// `#define NAME` with an optional parameter list.
    pub define: Regex,
    /// Block or line comment.
    pub comment: Regex,
    /// `#include` of a system or local header, capturing the path.
    pub include: Regex,
    /// C identifier, used for dependency scanning.
    pub ident: Regex,
    /// Identifier directly applied to an argument list.
    pub call: Regex,
    /// Splice artifact directly after an enum's trailing name: `} NAME;E;`.
    pub enum_tail_e: Regex,
    /// Junk run between an enum's trailing name and a second semicolon.
    pub enum_tail_junk: Regex,
}

impl ElementPatterns {
    pub fn new() -> Self {
        Self {
            function: Regex::new(
                r"(?:static\s+)?(?:SOD_APIEXPORT\s+)?(?:[a-zA-Z_][a-zA-Z0-9_*\s]+?\s+)([a-zA-Z_][a-zA-Z0-9_]*)\s*\([^{;]*?\)\s*\{",
            )
            .unwrap(),
            prototype: Regex::new(
                r"(?:SOD_APIEXPORT\s+)?(?:[a-zA-Z_][a-zA-Z0-9_*\s]+?\s+)([a-zA-Z_][a-zA-Z0-9_]*)\s*\([^{;]*\)\s*;",
            )
            .unwrap(),
            struct_def: Regex::new(
                r"typedef\s+struct\s+(?:[a-zA-Z_][a-zA-Z0-9_]*\s+)?\{[^}]*\}\s*([a-zA-Z_][a-zA-Z0-9_]*);|struct\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\{[^}]*\};",
            )
            .unwrap(),
            enum_def: Regex::new(r"typedef\s+enum\s*(?:\w+\s*)?\{[^}]*\}\s*(\w+);").unwrap(),
            global: Regex::new(
                r"(?:static|const|extern)?\s*(?:[a-zA-Z_][a-zA-Z0-9_]*\s+)+([a-zA-Z_][a-zA-Z0-9_]*)\s*(?:\[\s*[^\]]*\s*\])?\s*=",
            )
            .unwrap(),
            typedef: Regex::new(r"typedef\s+(\w+(?:\s*\*)?)\s+(\w+);").unwrap(),
            define: Regex::new(r"(#define\s+([a-zA-Z_][a-zA-Z0-9_]*))(?:\(([^)]*)\))?").unwrap(),
            comment: Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").unwrap(),
            include: Regex::new(r#"#include\s+[<"]([^">]+)[">]"#).unwrap(),
            ident: Regex::new(r"\b[a-zA-Z_][a-zA-Z0-9_]*").unwrap(),
            call: Regex::new(r"\b([a-zA-Z_][a-zA-Z0-9_]*)\s*\(").unwrap(),
            enum_tail_e: Regex::new(r"\}\s*(\w+)\s*;E;").unwrap(),
            enum_tail_junk: Regex::new(r"\}\s*(\w+)\s*;[^;]*;").unwrap(),
        }
    }
}

impl Default for ElementPatterns {
    fn default() -> Self {
        Self::new()
    }
}
