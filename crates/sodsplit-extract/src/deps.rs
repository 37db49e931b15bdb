//! Dependency scanning for extracted elements
//!
//! Dependencies are the identifiers an element's text mentions, minus C
//! keywords and a handful of ubiquitous names. Macro bodies get a stricter
//! scan: an identifier that is immediately applied, assigned or braced is a
//! definition site rather than a use, so it is dropped, while applied names
//! are kept as call dependencies.

use std::collections::BTreeSet;

use crate::patterns::ElementPatterns;

/// C keywords and names too common to be meaningful dependencies.
const KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "return", "break", "continue", "static", "const", "void", "int",
    "float", "double", "char", "unsigned", "signed", "typedef", "struct", "enum", "union",
    "extern", "sizeof", "NULL", "size_t",
];

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Collect the identifiers `content` mentions, minus keywords.
pub(crate) fn scan(patterns: &ElementPatterns, content: &str) -> BTreeSet<String> {
    let mut deps = BTreeSet::new();
    for m in patterns.ident.find_iter(content) {
        let word = m.as_str();
        if !is_keyword(word) {
            deps.insert(word.to_string());
        }
    }
    deps
}

/// Collect the dependencies of a macro body.
///
/// Parameters of a function-like macro are local to it and never count.
/// `define` itself is always dropped.
pub(crate) fn scan_macro(
    patterns: &ElementPatterns,
    content: &str,
    params: Option<&str>,
) -> BTreeSet<String> {
    let param_names: BTreeSet<&str> = params
        .map(|p| p.split(',').map(str::trim).filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    let mut deps = BTreeSet::new();
    for m in patterns.ident.find_iter(content) {
        let word = m.as_str();
        // An identifier directly followed by '(', '=' or '{' is being
        // defined or invoked here, not referenced.
        let rest = content[m.end()..].trim_start();
        if rest.starts_with('(') || rest.starts_with('=') || rest.starts_with('{') {
            continue;
        }
        if param_names.contains(word) || is_keyword(word) || word == "define" {
            continue;
        }
        deps.insert(word.to_string());
    }

    // Applied identifiers still matter: a macro expanding to a call depends
    // on the called function or macro.
    for caps in patterns.call.captures_iter(content) {
        let name = &caps[1];
        if name != "define" {
            deps.insert(name.to_string());
        }
    }

    deps
}
