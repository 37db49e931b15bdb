//! Per-module header synthesis.
//!
//! A module header re-exports the declarative side of its elements: type
//! definitions and macros verbatim, public function prototypes derived
//! from the bodies, and conditionals filtered down to the declarations
//! they guard. Static functions never surface in a header.

use sodsplit_core::directives::DirectiveBalance;
use sodsplit_core::{Element, ElementKind};
use sodsplit_extract::ElementPatterns;

/// Enum names hoisted into the `nn_types` header preamble, and therefore
/// skipped when its element stream is emitted.
const NN_TYPES_HOISTED: &[&str] = &["SOD_CNN_LAYER_TYPE", "learning_rate_policy", "COST_TYPE"];

/// Pick and shape the elements that belong in the header for `module`.
pub(crate) fn select(
    module: &str,
    elements: &[Element],
    patterns: &ElementPatterns,
) -> Vec<Element> {
    let mut selected = Vec::new();

    for elem in elements {
        match elem.kind {
            ElementKind::Struct | ElementKind::Typedef | ElementKind::Macro => {
                selected.push(elem.clone());
            }
            ElementKind::Enum => {
                // enums hoisted into a module preamble are not repeated
                if module == "nn_types" && NN_TYPES_HOISTED.contains(&elem.name.as_str()) {
                    continue;
                }
                if module == "activation" && elem.name == "ACTIVATION" {
                    continue;
                }
                selected.push(elem.clone());
            }
            ElementKind::Function => {
                if let Some(prototype) = prototype_of(elem) {
                    selected.push(prototype);
                }
            }
            ElementKind::Conditional => {
                if let Some(filtered) = filtered_conditional(elem, patterns) {
                    selected.push(filtered);
                }
            }
            _ => {}
        }
    }

    for elem in &mut selected {
        if elem.kind == ElementKind::Conditional {
            if let Some(cleaned) = crate::implfile::strip_stray_lines(&elem.content) {
                elem.content = cleaned;
            }
            close_open_directives(&mut elem.content);
        }
    }

    selected
}

/// Derive the public prototype of a function body, or nothing when the
/// function is static or its body start cannot be located.
fn prototype_of(elem: &Element) -> Option<Element> {
    let body_start = elem.content.find('{')?;
    let mut decl = elem.content[..body_start].trim().to_string();
    decl.push(';');
    if decl.starts_with("static") {
        return None;
    }
    let end = elem.start + decl.len();
    Some(Element::new(elem.name.clone(), ElementKind::Declaration, decl, elem.start, end))
}

/// Reduce a conditional to its declarations.
///
/// Keeps every preprocessor line, plus the lines inside an open directive
/// that carry a struct, enum, typedef or prototype the scan found in the
/// block. Conditionals guarding only code produce no header element.
fn filtered_conditional(elem: &Element, patterns: &ElementPatterns) -> Option<Element> {
    let content = &elem.content;
    if !patterns.struct_def.is_match(content)
        && !patterns.enum_def.is_match(content)
        && !patterns.typedef.is_match(content)
    {
        return None;
    }

    let mut decls: Vec<&str> = Vec::new();
    for m in patterns.struct_def.find_iter(content) {
        decls.push(m.as_str());
    }
    for m in patterns.enum_def.find_iter(content) {
        decls.push(m.as_str());
    }
    for m in patterns.typedef.find_iter(content) {
        decls.push(m.as_str());
    }
    for m in patterns.prototype.find_iter(content) {
        decls.push(m.as_str());
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut in_directive = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            kept.push(line);
            if trimmed.starts_with("#if") {
                in_directive = true;
            } else if trimmed.starts_with("#endif") {
                in_directive = false;
            }
        } else if in_directive && decls.iter().any(|decl| line.contains(decl)) {
            kept.push(line);
        }
    }

    let mut filtered = Element::new(
        elem.name.clone(),
        ElementKind::Conditional,
        kept.join("\n"),
        elem.start,
        elem.end,
    );
    filtered.deps = elem.deps.clone();
    Some(filtered)
}

/// Append an `#endif` for every directive the block leaves open.
fn close_open_directives(content: &mut String) {
    let missing = DirectiveBalance::of(content).missing_closes();
    for _ in 0..missing {
        content.push_str("\n#endif /* End of condition */\n");
    }
}

/// Assemble the header text for `module` from its selected elements.
pub(crate) fn assemble(module: &str, selected: &[Element], hoisted: Option<&str>) -> String {
    let upper = module.to_uppercase();
    let mut header = format!(
        "\n/* \n * sod_{}.h - Part of the SOD library\n * Generated from the original monolithic code\n */\n\n#ifndef SOD_{}_H__\n#define SOD_{}_H__\n\n#include \"sod/sod_common.h\"\n\n",
        module, upper, upper
    );

    if let Some(definitions) = hoisted {
        header.push_str(definitions);
        header.push_str("\n\n");
    }

    let mut ordered: Vec<&Element> = selected.iter().collect();
    ordered.sort_by_key(|e| e.start);
    for elem in ordered {
        header.push_str(&elem.content);
        header.push_str("\n\n");
    }

    header.push_str(&format!("\n#endif /* SOD_{}_H__ */\n", upper));
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn function(name: &str, content: &str) -> Element {
        Element::new(name, ElementKind::Function, content, 0, content.len())
    }

    #[test]
    fn test_prototype_derivation() {
        let elem = function("sod_make_image", "sod_img sod_make_image(int w, int h)\n{\n    return x;\n}");
        let proto = prototype_of(&elem).unwrap();
        assert_eq!(proto.content, "sod_img sod_make_image(int w, int h);");
        assert_eq!(proto.kind, ElementKind::Declaration);
    }

    #[test]
    fn test_static_functions_have_no_prototype() {
        let elem = function("clamp", "static float clamp(float v) { return v; }");
        assert!(prototype_of(&elem).is_none());
    }

    #[test]
    fn test_conditional_without_declarations_is_dropped() {
        let patterns = ElementPatterns::new();
        let elem = Element::new(
            "conditional",
            ElementKind::Conditional,
            "#ifdef SOD_ENABLE_NET_TRAIN\nx = 1;\n#endif",
            0,
            0,
        );
        assert!(filtered_conditional(&elem, &patterns).is_none());
    }

    #[test]
    fn test_conditional_keeps_guarded_typedef() {
        let patterns = ElementPatterns::new();
        let elem = Element::new(
            "conditional",
            ElementKind::Conditional,
            "#ifdef SOD_ENABLE_NET_TRAIN\ntypedef int sod_train_flag;\nrun();\n#endif",
            0,
            0,
        );
        let filtered = filtered_conditional(&elem, &patterns).unwrap();
        assert_eq!(
            filtered.content,
            "#ifdef SOD_ENABLE_NET_TRAIN\ntypedef int sod_train_flag;\n#endif"
        );
    }

    #[test]
    fn test_unbalanced_conditional_is_closed() {
        let mut content = String::from("#ifdef A\n#ifdef B\nint x;\n#endif");
        close_open_directives(&mut content);
        assert_eq!(DirectiveBalance::of(&content).missing_closes(), 0);
        assert!(content.contains("#endif /* End of condition */"));
    }

    #[test]
    fn test_assemble_orders_by_source_position() {
        let later = Element::new("b", ElementKind::Typedef, "typedef int b;", 50, 64);
        let earlier = Element::new("a", ElementKind::Typedef, "typedef int a;", 10, 24);
        let header = assemble("vfs", &[later, earlier], None);
        assert!(header.starts_with("\n/* \n * sod_vfs.h"));
        assert!(header.contains("#ifndef SOD_VFS_H__"));
        let a = header.find("typedef int a;").unwrap();
        let b = header.find("typedef int b;").unwrap();
        assert!(a < b);
        assert!(header.ends_with("\n#endif /* SOD_VFS_H__ */\n"));
    }

    #[test]
    fn test_select_skips_hoisted_enums() {
        let patterns = ElementPatterns::new();
        let cost = Element::new(
            "COST_TYPE",
            ElementKind::Enum,
            "typedef enum { SSE, MASKED } COST_TYPE;",
            0,
            39,
        );
        let other = Element::new(
            "tree_kind",
            ElementKind::Enum,
            "typedef enum { LEAF, NODE } tree_kind;",
            40,
            78,
        );
        let selected = select("nn_types", &[cost.clone(), other.clone()], &patterns);
        assert_eq!(selected, vec![other.clone()]);

        // the same enum passes through in any other module
        let selected = select("common", &[cost.clone()], &patterns);
        assert_eq!(selected, vec![cost]);
    }
}
