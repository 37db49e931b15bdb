//! `#define` extraction with line-continuation handling
//!
//! A definition runs to the first line that does not end in a backslash.
//! Function-like macros are recognized by a parameter list that directly
//! follows the name, with no whitespace in between; `#define MIN (x)` is an
//! object-like macro whose body happens to start with a parenthesis.

use sodsplit_core::{Element, ElementKind, SymbolTable};

use crate::deps;
use crate::patterns::ElementPatterns;

/// Extract macro definitions, multi-line bodies included.
pub(crate) fn extract(
    patterns: &ElementPatterns,
    source: &str,
    symbols: &mut SymbolTable,
) -> Vec<Element> {
    let mut out = Vec::new();

    for caps in patterns.define.captures_iter(source) {
        let m = caps.get(0).unwrap();
        let name = &caps[2];
        let params = caps.get(3).map(|g| g.as_str());
        let function_like = params.is_some();
        let start = m.start();

        // walk continuation lines; each segment keeps its newline so offsets
        // advance by exact byte counts
        let mut end = m.end();
        for segment in source[m.end()..].split_inclusive('\n') {
            end += segment.len();
            let line = segment.strip_suffix('\n').unwrap_or(segment);
            if !line.trim_end().ends_with('\\') {
                break;
            }
        }

        let content = source[start..end].trim();
        let mut elem = Element::new(name, ElementKind::Macro, content, start, end);
        elem.deps = deps::scan_macro(patterns, &elem.content, params);
        symbols.record_macro(name, function_like);
        out.push(elem);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line_macro() {
        let patterns = ElementPatterns::new();
        let mut symbols = SymbolTable::new();
        let src = "#define SOD_OK 0\nint x;\n";
        let found = extract(&patterns, src, &mut symbols);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "SOD_OK");
        assert_eq!(found[0].content, "#define SOD_OK 0");
        let info = symbols.get("SOD_OK").unwrap();
        assert!(!info.function_like);
    }

    #[test]
    fn test_multi_line_macro_spans_continuations() {
        let patterns = ElementPatterns::new();
        let mut symbols = SymbolTable::new();
        let src = "#define SWAP(a,b) do { \\\n    int t = (a); \\\n    (a) = (b); (b) = t; \\\n} while (0)\nint x;\n";
        let found = extract(&patterns, src, &mut symbols);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "SWAP");
        assert!(found[0].content.ends_with("} while (0)"));
        assert!(symbols.get("SWAP").unwrap().function_like);
    }

    #[test]
    fn test_parameter_list_must_touch_name() {
        let patterns = ElementPatterns::new();
        let mut symbols = SymbolTable::new();
        let found = extract(&patterns, "#define MIN (x)\n", &mut symbols);
        assert_eq!(found.len(), 1);
        assert!(!symbols.get("MIN").unwrap().function_like);
    }

    #[test]
    fn test_macro_at_end_of_file_without_newline() {
        let patterns = ElementPatterns::new();
        let mut symbols = SymbolTable::new();
        let found = extract(&patterns, "#define LAST 1", &mut symbols);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "#define LAST 1");
        assert_eq!(found[0].end, 14);
    }
}
