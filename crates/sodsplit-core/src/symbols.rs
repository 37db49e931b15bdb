//! Symbol table shared across the partitioning phases

use crate::element::ElementKind;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Everything known about one named symbol
#[derive(Debug, Clone, Serialize)]
pub struct SymbolInfo {
    /// Kind of the element that defined the symbol
    pub kind: ElementKind,
    /// Module the classifier assigned the symbol to; set once, the first
    /// assignment is authoritative for all later include inference
    pub assigned_module: Option<&'static str>,
    /// Modules whose elements reference this symbol
    pub used_in: BTreeSet<&'static str>,
    /// True for macros declared with a parameter list
    pub function_like: bool,
}

/// Symbol table keyed by symbol name.
///
/// Built during extraction, completed during classification. Every named
/// element maps to exactly one entry; the first recorded kind wins when
/// two extraction passes claim the same name.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SymbolTable {
    symbols: BTreeMap<String, SymbolInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a symbol definition. A name already present keeps its
    /// original kind.
    pub fn record(&mut self, name: &str, kind: ElementKind) {
        self.symbols.entry(name.to_string()).or_insert(SymbolInfo {
            kind,
            assigned_module: None,
            used_in: BTreeSet::new(),
            function_like: false,
        });
    }

    /// Record a macro, remembering whether it takes parameters.
    pub fn record_macro(&mut self, name: &str, function_like: bool) {
        let info = self.symbols.entry(name.to_string()).or_insert(SymbolInfo {
            kind: ElementKind::Macro,
            assigned_module: None,
            used_in: BTreeSet::new(),
            function_like: false,
        });
        if info.kind == ElementKind::Macro {
            info.function_like = function_like;
        }
    }

    /// Assign a symbol to a module. The first assignment wins; later
    /// calls for the same name are ignored.
    pub fn assign_module(&mut self, name: &str, module: &'static str) {
        if let Some(info) = self.symbols.get_mut(name) {
            if info.assigned_module.is_none() {
                info.assigned_module = Some(module);
            }
        }
    }

    /// Module the symbol was assigned to, if classified.
    pub fn module_of(&self, name: &str) -> Option<&'static str> {
        self.symbols.get(name).and_then(|info| info.assigned_module)
    }

    /// Note that `module` references the symbol `name`.
    pub fn mark_used_in(&mut self, name: &str, module: &'static str) {
        if let Some(info) = self.symbols.get_mut(name) {
            info.used_in.insert(module);
        }
    }

    pub fn get(&self, name: &str) -> Option<&SymbolInfo> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolInfo)> {
        self.symbols.iter().map(|(name, info)| (name.as_str(), info))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_kind_wins() {
        let mut table = SymbolTable::new();
        table.record("layer", ElementKind::Struct);
        table.record("layer", ElementKind::Typedef);
        assert_eq!(table.get("layer").unwrap().kind, ElementKind::Struct);
    }

    #[test]
    fn test_assign_module_is_set_once() {
        let mut table = SymbolTable::new();
        table.record("forward_softmax", ElementKind::Function);
        table.assign_module("forward_softmax", "softmax_impl");
        table.assign_module("forward_softmax", "nn_utils");
        assert_eq!(table.module_of("forward_softmax"), Some("softmax_impl"));
    }

    #[test]
    fn test_function_like_flag() {
        let mut table = SymbolTable::new();
        table.record_macro("MIN", true);
        table.record_macro("TWO_PI", false);
        assert!(table.get("MIN").unwrap().function_like);
        assert!(!table.get("TWO_PI").unwrap().function_like);
    }

    #[test]
    fn test_used_in_tracking() {
        let mut table = SymbolTable::new();
        table.record("sod_img", ElementKind::Typedef);
        table.mark_used_in("sod_img", "cnn");
        table.mark_used_in("sod_img", "detection");
        table.mark_used_in("sod_img", "cnn");
        let info = table.get("sod_img").unwrap();
        assert_eq!(info.used_in.len(), 2);
        // unrecorded names are ignored rather than invented
        table.mark_used_in("missing", "common");
        assert!(!table.contains("missing"));
    }
}
