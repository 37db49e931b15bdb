//! Function definition extraction
//!
//! The pattern anchors on a signature's opening brace; the body is completed
//! by a raw brace-depth scan. The scan is capped so a brace imbalance deep in
//! the amalgamation cannot turn one bad match into a whole-file element.

use sodsplit_core::{Element, ElementKind, SymbolTable};
use tracing::warn;

use crate::deps;
use crate::patterns::ElementPatterns;

/// Upper bound on how far past the opening brace a body scan may run.
const MAX_BODY_SCAN: usize = 100_000;

/// Extract function definitions, bodies included.
pub(crate) fn extract(
    patterns: &ElementPatterns,
    source: &str,
    symbols: &mut SymbolTable,
) -> Vec<Element> {
    let bytes = source.as_bytes();
    let mut out = Vec::new();

    for caps in patterns.function.captures_iter(source) {
        let m = caps.get(0).unwrap();
        let name = &caps[1];
        let start = m.start();

        let mut depth = 1usize;
        let mut pos = m.end();
        let limit = MAX_BODY_SCAN.min(source.len() - pos);
        let mut scanned = 0usize;

        while depth > 0 && pos < source.len() && scanned < limit {
            match bytes[pos] {
                b'{' => depth += 1,
                b'}' => depth -= 1,
                _ => {}
            }
            pos += 1;
            scanned += 1;
        }

        if depth > 0 && scanned >= limit {
            warn!("Could not find end of function {} within safety limit, skipping", name);
            continue;
        }
        if depth > 0 {
            // ran off the end of the file; not a usable definition
            continue;
        }

        let mut elem =
            Element::new(name, ElementKind::Function, source[start..pos].trim(), start, pos);
        elem.deps = deps::scan(patterns, &elem.content);
        symbols.record(name, ElementKind::Function);
        out.push(elem);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_body_with_nested_braces() {
        let patterns = ElementPatterns::new();
        let mut symbols = SymbolTable::new();
        let src = "static float sum_array(float *a, int n) {\n    float s = 0;\n    for (int i = 0; i < n; i++) { s += a[i]; }\n    return s;\n}\n";
        let found = extract(&patterns, src, &mut symbols);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "sum_array");
        assert!(found[0].content.ends_with('}'));
        assert!(found[0].deps.contains("s"));
        assert_eq!(symbols.get("sum_array").map(|s| s.kind), Some(ElementKind::Function));
    }

    #[test]
    fn test_unterminated_body_is_dropped() {
        let patterns = ElementPatterns::new();
        let mut symbols = SymbolTable::new();
        let src = "void broken(int x) {\n    if (x) {\n";
        assert!(extract(&patterns, src, &mut symbols).is_empty());
    }

    #[test]
    fn test_two_functions_back_to_back() {
        let patterns = ElementPatterns::new();
        let mut symbols = SymbolTable::new();
        let src = "int one(void) { return 1; }\nint two(void) { return 2; }\n";
        let found = extract(&patterns, src, &mut symbols);
        let names: Vec<&str> = found.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }
}
