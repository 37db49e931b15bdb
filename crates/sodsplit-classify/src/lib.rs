//! sodsplit Classify
//!
//! Assigns every extracted element to one of the registered modules. Named
//! elements go through per-kind rule tables, with three pinned lists applied
//! first: common enums, common types and required constants always land in
//! `common` so the shared header can re-export them. Conditionals are placed
//! last, in groups, once every name has a module to vote with.

mod depgraph;
mod grouper;
pub mod rules;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sodsplit_core::{registry, Element, SymbolTable};
use sodsplit_extract::Extraction;
use tracing::{debug, info};

/// The classified split: per-module element lists plus the updated symbol
/// table and the module usage graph.
#[derive(Debug, Serialize)]
pub struct SplitPlan {
    /// Elements per module, ordered by original source position. Only
    /// modules that received at least one element appear.
    pub modules: BTreeMap<&'static str, Vec<Element>>,
    /// Symbol table with module assignments and cross-module usage filled in.
    pub symbols: SymbolTable,
    /// For each module, the modules whose symbols it references.
    pub module_deps: BTreeMap<&'static str, BTreeSet<&'static str>>,
}

impl SplitPlan {
    /// Elements assigned to `module`, if any were.
    pub fn module(&self, name: &str) -> Option<&[Element]> {
        self.modules.get(name).map(Vec::as_slice)
    }

    pub fn total_elements(&self) -> usize {
        self.modules.values().map(Vec::len).sum()
    }
}

/// Maps elements to modules.
pub struct Classifier {
    router: grouper::ConditionalRouter,
}

impl Classifier {
    pub fn new() -> Self {
        Self { router: grouper::ConditionalRouter::new() }
    }

    /// Assign every element of `extraction` to a module.
    pub fn classify(&self, extraction: &Extraction) -> SplitPlan {
        info!("Mapping symbols to modules");

        let mut symbols = extraction.symbols.clone();
        let mut modules: BTreeMap<&'static str, Vec<Element>> = BTreeMap::new();

        for func in &extraction.functions {
            let module = rules::function_module(&func.name);
            place(&mut modules, &mut symbols, func, module);
        }
        for strct in &extraction.structs {
            let module = rules::struct_module(&strct.name);
            place(&mut modules, &mut symbols, strct, module);
        }
        for enm in &extraction.enums {
            let module = if registry::COMMON_ENUMS.contains(&enm.name.as_str()) {
                "common"
            } else {
                rules::enum_module(&enm.name)
            };
            place(&mut modules, &mut symbols, enm, module);
        }
        for typedef in &extraction.typedefs {
            let module = if registry::COMMON_TYPES.contains(&typedef.name.as_str()) {
                "common"
            } else if typedef.name.ends_with("_layer") {
                "nn_types"
            } else {
                rules::typedef_module(&typedef.name)
            };
            place(&mut modules, &mut symbols, typedef, module);
        }
        for global in &extraction.globals {
            let module = rules::global_module(&global.name);
            place(&mut modules, &mut symbols, global, module);
        }
        for mac in &extraction.macros {
            let module = if registry::REQUIRED_CONSTANTS.contains(&mac.name.as_str()) {
                "common"
            } else {
                rules::macro_module(&mac.name)
            };
            place(&mut modules, &mut symbols, mac, module);
        }

        let module_deps = depgraph::analyze(&modules, &mut symbols);

        // conditionals are placed in groups, after the names they vote with
        for indices in grouper::group(&extraction.conditionals) {
            let members: Vec<&Element> =
                indices.iter().map(|&i| &extraction.conditionals[i]).collect();
            let module = self.router.assign(&members, &symbols);
            for member in members {
                modules.entry(module).or_default().push(member.clone());
            }
        }

        for elements in modules.values_mut() {
            elements.sort_by_key(|e| e.start);
        }

        for (module, elements) in &modules {
            debug!("{}: {} elements", module, elements.len());
        }
        info!("Classified {} elements into {} modules",
            modules.values().map(Vec::len).sum::<usize>(), modules.len());

        SplitPlan { modules, symbols, module_deps }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

fn place(
    modules: &mut BTreeMap<&'static str, Vec<Element>>,
    symbols: &mut SymbolTable,
    elem: &Element,
    module: &'static str,
) {
    symbols.assign_module(&elem.name, module);
    modules.entry(module).or_default().push(elem.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sodsplit_core::ElementKind;
    use sodsplit_extract::Extractor;

    const SAMPLE: &str = r#"/* classification sample */
#define SOD_OK 0
#define IMG_SCALE 2

typedef enum { RELU, TANH } ACTIVATION;

typedef struct { int w; int h; } sod_img;

typedef float softmax_layer;

static void forward_softmax_layer(softmax_layer l) {
    (void)l;
}

static void sod_grow_image(sod_img im) {
    (void)im;
}

#ifdef IMG_SCALE
static int img_extra = 1;
#endif
"#;

    fn classify(src: &str) -> SplitPlan {
        let extraction = Extractor::new().extract(src);
        Classifier::new().classify(&extraction)
    }

    #[test]
    fn test_pins_win_over_rule_tables() {
        let plan = classify(SAMPLE);
        // ACTIVATION is a common enum even though its name matches nn_types
        assert_eq!(plan.symbols.module_of("ACTIVATION"), Some("common"));
        // softmax_layer is a common type even though the suffix says nn_types
        assert_eq!(plan.symbols.module_of("softmax_layer"), Some("common"));
        assert_eq!(plan.symbols.module_of("SOD_OK"), Some("common"));
    }

    #[test]
    fn test_rules_place_the_rest() {
        let plan = classify(SAMPLE);
        assert_eq!(plan.symbols.module_of("forward_softmax_layer"), Some("softmax_impl"));
        assert_eq!(plan.symbols.module_of("sod_grow_image"), Some("img_utils"));
        assert_eq!(plan.symbols.module_of("sod_img"), Some("img_utils"));
        assert_eq!(plan.symbols.module_of("IMG_SCALE"), Some("img_utils"));
    }

    #[test]
    fn test_module_deps_follow_symbol_usage() {
        let plan = classify(SAMPLE);
        // forward_softmax_layer references the common typedef softmax_layer
        let deps = plan.module_deps.get("softmax_impl").cloned().unwrap_or_default();
        assert!(deps.contains("common"));
        let info = plan.symbols.get("softmax_layer").unwrap();
        assert!(info.used_in.contains("softmax_impl"));
    }

    #[test]
    fn test_guarded_conditional_follows_its_macro() {
        let plan = classify(SAMPLE);
        let img = plan.module("img_utils").unwrap();
        assert!(img.iter().any(|e| e.kind == ElementKind::Conditional));
    }

    #[test]
    fn test_module_elements_sorted_by_position() {
        let plan = classify(SAMPLE);
        for elements in plan.modules.values() {
            let mut prev = 0;
            for e in elements {
                assert!(e.start >= prev);
                prev = e.start;
            }
        }
    }

    #[test]
    fn test_every_named_module_is_registered() {
        let plan = classify(SAMPLE);
        for module in plan.modules.keys() {
            assert!(sodsplit_core::registry::is_module(module), "unknown module {}", module);
        }
    }
}
