//! Conditional block grouping and placement
//!
//! Related conditionals must land in the same module or a split would tear
//! platform sections apart. Blocks are grouped by extraction name first
//! (multi-part chains already share one), then nearby blocks with similar
//! opening conditions join the group. Each group is placed as a unit: forced
//! routes for platform and guard checks, otherwise a vote over the
//! classified symbols the text mentions.

use std::collections::BTreeMap;

use regex::Regex;
use sodsplit_core::directives::parse_directive;
use sodsplit_core::{Element, SymbolTable};

/// Macros that identify host-platform conditionals.
const PLATFORM_MACROS: &[&str] =
    &["_WIN32", "__APPLE__", "__linux__", "_MSC_VER", "OS_WIN", "OS_UNIX", "OS_OTHER"];

/// Prefixes of feature-toggle macros.
const FEATURE_PREFIXES: &[&str] = &["HAVE_", "USE_", "ENABLE_", "CONFIG_", "WITH_"];

/// Two sibling conditionals farther apart than this never join a group.
const GROUP_DISTANCE: usize = 1000;

/// Condition text of the first opening directive in a block.
fn opening_condition(content: &str) -> String {
    for line in content.lines() {
        if let Some((kind, cond)) = parse_directive(line) {
            if kind.opens() {
                return cond.to_string();
            }
        }
    }
    String::new()
}

fn mentions_platform(cond: &str) -> bool {
    PLATFORM_MACROS.iter().any(|p| cond.contains(p))
}

fn is_feature_toggle(cond: &str) -> bool {
    FEATURE_PREFIXES.iter().any(|p| cond.starts_with(p))
}

/// Whether two opening conditions belong to the same logical region.
fn conditions_similar(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if mentions_platform(a) && mentions_platform(b) {
        return true;
    }
    if is_feature_toggle(a) && is_feature_toggle(b) {
        return true;
    }
    a.strip_prefix('!') == Some(b) || b.strip_prefix('!') == Some(a)
}

/// Partition conditionals into placement groups.
///
/// Returns indices into the input slice. Group order follows first
/// appearance in the source.
pub(crate) fn group(conditionals: &[Element]) -> Vec<Vec<usize>> {
    let mut name_order: Vec<&str> = Vec::new();
    let mut by_name: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, cond) in conditionals.iter().enumerate() {
        if !by_name.contains_key(cond.name.as_str()) {
            name_order.push(&cond.name);
        }
        by_name.entry(&cond.name).or_default().push(i);
    }

    let mut grouped = vec![false; conditionals.len()];
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for name in name_order {
        let members = &by_name[name];

        // multi-part chains already share a name that encodes the condition
        if name.starts_with("multipart_conditional_") {
            for &i in members {
                grouped[i] = true;
            }
            groups.push(members.clone());
            continue;
        }

        for &i in members {
            if grouped[i] {
                continue;
            }
            grouped[i] = true;
            let mut group = vec![i];
            let anchor = opening_condition(&conditionals[i].content);

            for &j in members {
                if grouped[j] {
                    continue;
                }
                let near = conditionals[i].start.abs_diff(conditionals[j].start) < GROUP_DISTANCE;
                if near && conditions_similar(&anchor, &opening_condition(&conditionals[j].content))
                {
                    grouped[j] = true;
                    group.push(j);
                }
            }
            groups.push(group);
        }
    }

    groups
}

/// Places conditional groups into modules.
pub(crate) struct ConditionalRouter {
    platform_if: Regex,
    os_if: Regex,
    guard_name: Regex,
}

impl ConditionalRouter {
    pub(crate) fn new() -> Self {
        Self {
            platform_if: Regex::new(
                r"#if\s+defined\s*\(\s*(_WIN32|__APPLE__|__linux__|_MSC_VER)\s*\)",
            )
            .unwrap(),
            os_if: Regex::new(r"#if\s+defined\s*\(\s*(OS_WIN|OS_UNIX|OS_OTHER)\s*\)").unwrap(),
            guard_name: Regex::new(r"#if(?:n)?def\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap(),
        }
    }

    /// Pick the module for one group.
    ///
    /// Platform and OS selection blocks always go to `common`. A block
    /// guarding on a classified macro follows that macro. Anything else is
    /// voted on: each classified symbol mentioned in a block's text counts
    /// one vote for its module, the majority wins, and ties fall to the
    /// lexicographically smallest module name.
    pub(crate) fn assign(&self, group: &[&Element], symbols: &SymbolTable) -> &'static str {
        for cond in group {
            let content = cond.content.as_str();
            if self.platform_if.is_match(content) || self.os_if.is_match(content) {
                return "common";
            }
            if let Some(caps) = self.guard_name.captures(content) {
                if let Some(module) = symbols.module_of(&caps[1]) {
                    return module;
                }
            }
        }

        let mut votes: BTreeMap<&'static str, usize> = BTreeMap::new();
        for cond in group {
            for (name, info) in symbols.iter() {
                if let Some(module) = info.assigned_module {
                    if cond.content.contains(name) {
                        *votes.entry(module).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut best: Option<(&'static str, usize)> = None;
        for (module, count) in votes {
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((module, count)),
            }
        }
        best.map(|(module, _)| module).unwrap_or("common")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sodsplit_core::{ElementKind, SymbolTable};

    fn cond(name: &str, content: &str, start: usize) -> Element {
        Element::new(name, ElementKind::Conditional, content, start, start + content.len())
    }

    #[test]
    fn test_nearby_platform_blocks_group_together() {
        let blocks = vec![
            cond("conditional", "#ifdef _WIN32\nint a;\n#endif", 0),
            cond("conditional", "#ifdef __APPLE__\nint b;\n#endif", 500),
            cond("conditional", "#ifdef _WIN32\nint c;\n#endif", 5000),
        ];
        let groups = group(&blocks);
        assert_eq!(groups, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_negated_condition_joins_group() {
        let blocks = vec![
            cond("conditional", "#if !SOD_DISABLE_IMG_READER\nint a;\n#endif", 0),
            cond("conditional", "#if SOD_DISABLE_IMG_READER\nint b;\n#endif", 100),
        ];
        let groups = group(&blocks);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_multipart_names_group_by_name_only() {
        let blocks = vec![
            cond("multipart_conditional_defined(__linux__)", "#if defined(__linux__)\nint a;\n#else\nint b;\n#endif", 0),
            cond("conditional", "#ifdef HAVE_X\nint c;\n#endif", 10),
            cond("multipart_conditional_defined(__linux__)", "#if defined(__linux__)\nint d;\n#else\nint e;\n#endif", 20_000),
        ];
        let groups = group(&blocks);
        assert_eq!(groups, vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_platform_selection_forces_common() {
        let router = ConditionalRouter::new();
        let symbols = SymbolTable::new();
        let block = cond("conditional", "#if defined(_WIN32)\n#include <windows.h>\n#endif", 0);
        assert_eq!(router.assign(&[&block], &symbols), "common");
    }

    #[test]
    fn test_guard_on_classified_macro_follows_it() {
        let router = ConditionalRouter::new();
        let mut symbols = SymbolTable::new();
        symbols.record_macro("SOD_DISABLE_CNN", false);
        symbols.assign_module("SOD_DISABLE_CNN", "cnn");
        let block = cond("conditional", "#ifndef SOD_DISABLE_CNN\nvoid f(void);\n#endif", 0);
        assert_eq!(router.assign(&[&block], &symbols), "cnn");
    }

    #[test]
    fn test_vote_majority_and_tie_break() {
        let router = ConditionalRouter::new();
        let mut symbols = SymbolTable::new();
        symbols.record("sod_img", ElementKind::Struct);
        symbols.assign_module("sod_img", "img_utils");
        symbols.record("sod_box", ElementKind::Struct);
        symbols.assign_module("sod_box", "box_utils");

        // one mention each: tie falls to the smaller module name
        let tied = cond("conditional", "#if SOD_ENABLE_EXTRA\nsod_img i; sod_box b;\n#endif", 0);
        assert_eq!(router.assign(&[&tied], &symbols), "box_utils");

        // a second block mentioning only sod_img swings the majority
        let img_only = cond("conditional", "#if SOD_ENABLE_MORE\nsod_img j;\n#endif", 100);
        assert_eq!(router.assign(&[&tied, &img_only], &symbols), "img_utils");
    }

    #[test]
    fn test_vote_without_mentions_defaults_to_common() {
        let router = ConditionalRouter::new();
        let symbols = SymbolTable::new();
        let block = cond("conditional", "#if SOD_ENABLE_EXTRA\nint x;\n#endif", 0);
        assert_eq!(router.assign(&[&block], &symbols), "common");
    }
}
