//! Module usage graph
//!
//! Once every named element has a module, each element's free identifiers
//! are resolved against the symbol table. A reference into another module
//! marks the symbol as used there and records the module-level dependency
//! edge. Conditionals are not classified yet when this runs; the vote that
//! places them uses the assignments made here.

use std::collections::{BTreeMap, BTreeSet};

use sodsplit_core::{Element, SymbolTable};
use tracing::debug;

/// Resolve cross-module references and record them on both sides.
pub(crate) fn analyze(
    modules: &BTreeMap<&'static str, Vec<Element>>,
    symbols: &mut SymbolTable,
) -> BTreeMap<&'static str, BTreeSet<&'static str>> {
    let mut module_deps: BTreeMap<&'static str, BTreeSet<&'static str>> = BTreeMap::new();

    for (&module, elements) in modules {
        for elem in elements {
            for dep in &elem.deps {
                let owner = match symbols.module_of(dep) {
                    Some(owner) => owner,
                    None => continue,
                };
                if owner != module {
                    symbols.mark_used_in(dep, module);
                    module_deps.entry(module).or_default().insert(owner);
                }
            }
        }
    }

    for (module, deps) in &module_deps {
        debug!("{} depends on: {}", module, deps.iter().copied().collect::<Vec<_>>().join(", "));
    }

    module_deps
}
