//! Regex-driven passes for self-delimiting elements
//!
//! Comments, includes, enums, structs, globals and simple typedefs all end
//! where their pattern ends (or at the next semicolon), so a single scan per
//! kind is enough. Function bodies, conditionals and continued macros need
//! stateful scans and live in their own modules.

use sodsplit_core::{Element, ElementKind, SymbolTable};
use tracing::debug;

use crate::deps;
use crate::patterns::ElementPatterns;

/// Extract every comment as an element named `comment`.
pub(crate) fn comments(patterns: &ElementPatterns, source: &str) -> Vec<Element> {
    patterns
        .comment
        .find_iter(source)
        .map(|m| Element::new("comment", ElementKind::Comment, m.as_str(), m.start(), m.end()))
        .collect()
}

/// Extract `#include` lines, named after the included path.
pub(crate) fn includes(patterns: &ElementPatterns, source: &str) -> Vec<Element> {
    patterns
        .include
        .captures_iter(source)
        .map(|caps| {
            let m = caps.get(0).unwrap();
            Element::new(&caps[1], ElementKind::Include, m.as_str(), m.start(), m.end())
        })
        .collect()
}

/// Extract `typedef enum {...} name;` blocks.
///
/// Splice artifacts that end up inside a block span (`} NAME;E;` and longer
/// junk runs) are scrubbed before the block is stored.
pub(crate) fn enums(
    patterns: &ElementPatterns,
    source: &str,
    symbols: &mut SymbolTable,
) -> Vec<Element> {
    let mut out = Vec::new();
    for caps in patterns.enum_def.captures_iter(source) {
        let m = caps.get(0).unwrap();
        let name = &caps[1];

        let cleaned = patterns.enum_tail_e.replace_all(m.as_str(), "} ${1};");
        let cleaned = patterns.enum_tail_junk.replace_all(&cleaned, "} ${1};");

        let mut elem = Element::new(name, ElementKind::Enum, cleaned.as_ref(), m.start(), m.end());
        elem.deps = deps::scan(patterns, &elem.content);
        symbols.record(name, ElementKind::Enum);
        out.push(elem);
    }
    out
}

/// Extract struct definitions in both `typedef struct` and tagged form.
pub(crate) fn structs(
    patterns: &ElementPatterns,
    source: &str,
    symbols: &mut SymbolTable,
) -> Vec<Element> {
    let mut out = Vec::new();
    for caps in patterns.struct_def.captures_iter(source) {
        let m = caps.get(0).unwrap();
        let name = match caps.get(1).or_else(|| caps.get(2)) {
            Some(g) => g.as_str(),
            None => continue,
        };
        let mut elem =
            Element::new(name, ElementKind::Struct, m.as_str().trim(), m.start(), m.end());
        elem.deps = deps::scan(patterns, &elem.content);
        symbols.record(name, ElementKind::Struct);
        out.push(elem);
    }
    out
}

/// Extract global variable definitions.
///
/// The pattern anchors on the `=` of an initializer; the element runs to the
/// next semicolon. Matches containing a parenthesized fragment are skipped,
/// since those are function signatures with default-looking initializers or
/// function pointer assignments.
pub(crate) fn globals(
    patterns: &ElementPatterns,
    source: &str,
    symbols: &mut SymbolTable,
) -> Vec<Element> {
    let mut out = Vec::new();
    for caps in patterns.global.captures_iter(source) {
        let m = caps.get(0).unwrap();
        let name = &caps[1];

        let semi = match source[m.end()..].find(';') {
            Some(rel) => m.end() + rel,
            None => continue,
        };
        let end = semi + 1;
        let content = source[m.start()..end].trim();
        if content.contains('(') && content.contains(')') {
            debug!("Skipping function-like match for global candidate {}", name);
            continue;
        }

        let mut elem = Element::new(name, ElementKind::Global, content, m.start(), end);
        elem.deps = deps::scan(patterns, &elem.content);
        symbols.record(name, ElementKind::Global);
        out.push(elem);
    }
    out
}

/// Extract simple `typedef <src> <name>;` aliases.
///
/// `typedef struct`/`typedef enum` spellings are handled by the struct and
/// enum passes and rejected here by source-type prefix, mirroring how the
/// pattern distinguishes them. The source type itself counts as a dependency.
pub(crate) fn typedefs(
    patterns: &ElementPatterns,
    source: &str,
    symbols: &mut SymbolTable,
) -> Vec<Element> {
    let mut out = Vec::new();
    for caps in patterns.typedef.captures_iter(source) {
        let m = caps.get(0).unwrap();
        let src = &caps[1];
        let name = &caps[2];
        if src.starts_with("struct") || src.starts_with("enum") {
            continue;
        }

        let mut elem = Element::new(name, ElementKind::Typedef, m.as_str(), m.start(), m.end());
        elem.deps = deps::scan(patterns, &elem.content);
        elem.deps.insert(src.trim().to_string());
        symbols.record(name, ElementKind::Typedef);
        out.push(elem);
    }
    out
}
