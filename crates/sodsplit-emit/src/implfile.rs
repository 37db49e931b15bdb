//! Per-module implementation unit synthesis.
//!
//! Implementation files carry function bodies, globals and every
//! conditional the header pass did not absorb whole. Each unit starts
//! from the standard include block, its own header and the inferred
//! cross-module includes, then streams elements in source order.

use std::collections::BTreeSet;

use sodsplit_core::directives::DirectiveBalance;
use sodsplit_core::registry::STANDARD_HEADERS;
use sodsplit_core::{Element, ElementKind};

/// Pick the elements that belong in the implementation unit.
///
/// A conditional is excluded only when the header kept it unchanged;
/// a filtered copy in the header still leaves the full block here.
pub(crate) fn select(elements: &[Element], header_elements: &[Element]) -> Vec<Element> {
    let mut selected = Vec::new();

    for elem in elements {
        let wanted = match elem.kind {
            ElementKind::Function | ElementKind::Global => true,
            ElementKind::Conditional => !header_elements.contains(elem),
            _ => false,
        };
        if wanted {
            selected.push(elem.clone());
        }
    }

    for elem in &mut selected {
        if elem.kind == ElementKind::Conditional {
            let missing = DirectiveBalance::of(&elem.content).missing_closes();
            for _ in 0..missing {
                elem.content.push_str("\n#endif /* End of condition */\n");
            }
        }
    }

    selected
}

/// Drop stray directive fragments left behind by body extraction: bare
/// `endif` or `else` words and `else if` heads orphaned from their
/// braces. Returns the cleaned text only when something was dropped.
pub(crate) fn strip_stray_lines(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    let kept: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| {
            let trimmed = line.trim();
            trimmed != "endif" && trimmed != "else" && !trimmed.starts_with("else if")
        })
        .collect();
    if kept.len() < lines.len() {
        Some(kept.join("\n"))
    } else {
        None
    }
}

/// Assemble the implementation text for `module`.
pub(crate) fn assemble(
    module: &str,
    selected: &[Element],
    includes: &BTreeSet<&'static str>,
) -> String {
    let mut unit = format!(
        "\n/* \n * sod_{}.c - Part of the SOD library\n * Generated from the original monolithic code\n */\n\n",
        module
    );

    for header in STANDARD_HEADERS {
        unit.push_str(&format!("#include {}\n", header));
    }

    unit.push_str(&format!("\n#include \"sod_{}.h\"\n", module));

    for include in includes {
        if *include != module {
            unit.push_str(&format!("#include \"sod/sod_{}.h\"\n", include));
        }
    }

    unit.push('\n');

    // keep the OS probe satisfied even when no platform branch matched
    if module == "common" {
        unit.push_str("#ifndef OS_OTHER\n#define OS_OTHER\n#endif\n\n");
    }

    let mut ordered: Vec<&Element> = selected.iter().collect();
    ordered.sort_by_key(|e| e.start);
    for elem in ordered {
        let cleaned = match elem.kind {
            ElementKind::Function | ElementKind::Conditional => strip_stray_lines(&elem.content),
            _ => None,
        };
        match cleaned {
            Some(content) => unit.push_str(&content),
            None => unit.push_str(&elem.content),
        }
        unit.push_str("\n\n");
    }

    unit
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn elem(name: &str, kind: ElementKind, content: &str, start: usize) -> Element {
        Element::new(name, kind, content, start, start + content.len())
    }

    #[test]
    fn test_select_takes_bodies_and_globals() {
        let func = elem("f", ElementKind::Function, "int f(void) { return 1; }", 0);
        let global = elem("g", ElementKind::Global, "static int g = 0;", 30);
        let typedef = elem("t", ElementKind::Typedef, "typedef int t;", 60);
        let selected = select(&[func.clone(), global.clone(), typedef], &[]);
        assert_eq!(selected, vec![func, global]);
    }

    #[test]
    fn test_conditional_absorbed_by_header_is_excluded() {
        let guarded = elem(
            "conditional",
            ElementKind::Conditional,
            "#ifdef X\ntypedef int t;\n#endif",
            0,
        );
        // identical copy in the header: the block was declarations only
        assert!(select(&[guarded.clone()], &[guarded.clone()]).is_empty());

        // a filtered copy differs, so the full block still lands here
        let mut filtered = guarded.clone();
        filtered.content = String::from("#ifdef X\n#endif");
        assert_eq!(select(&[guarded.clone()], &[filtered]), vec![guarded]);
    }

    #[test]
    fn test_stray_directive_lines_are_dropped() {
        let content = "int f(void) {\nendif\nelse\n    return 1;\n}";
        assert_eq!(
            strip_stray_lines(content).unwrap(),
            "int f(void) {\n    return 1;\n}"
        );
        // real preprocessor lines and brace-attached else survive
        assert!(strip_stray_lines("#ifdef A\n#else\n#endif").is_none());
        assert!(strip_stray_lines("} else {\n}").is_none());
    }

    #[test]
    fn test_assemble_layout() {
        let func = elem("f", ElementKind::Function, "int f(void) { return 1; }", 0);
        let includes = BTreeSet::from(["common", "nn_types"]);
        let unit = assemble("cnn", &[func], &includes);

        assert!(unit.starts_with("\n/* \n * sod_cnn.c - Part of the SOD library"));
        assert!(unit.contains("#include <stdlib.h>\n"));
        assert!(unit.contains("\n#include \"sod_cnn.h\"\n"));
        assert!(unit.contains("#include \"sod/sod_common.h\"\n"));
        assert!(unit.contains("#include \"sod/sod_nn_types.h\"\n"));
        assert!(unit.contains("int f(void) { return 1; }\n\n"));
    }

    #[test]
    fn test_assemble_skips_self_include_and_guards_common() {
        let includes = BTreeSet::from(["common", "vfs"]);
        let unit = assemble("vfs", &[], &includes);
        assert!(!unit.contains("#include \"sod/sod_vfs.h\""));
        assert!(unit.contains("#include \"sod_vfs.h\""));

        let unit = assemble("common", &[], &BTreeSet::new());
        assert!(unit.contains("#ifndef OS_OTHER\n#define OS_OTHER\n#endif\n\n"));
    }
}
