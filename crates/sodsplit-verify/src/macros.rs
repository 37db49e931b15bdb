//! Macro-level checks: continuations, redefinitions, orphan `#undef`s,
//! directive nesting and parameter hygiene.

use std::collections::BTreeSet;
use std::time::Duration;

use regex::Regex;
use sodsplit_core::directives::DirectiveTracker;
use sodsplit_core::TimeBudget;
use tracing::{debug, warn};

const FILE_BUDGET: Duration = Duration::from_secs(5);

/// Character width past which a `#define` line is wrapped.
const DEFINE_WRAP_COLUMN: usize = 79;

pub(crate) struct MacroPatterns {
    /// `#define NAME` anchored to the start of a line.
    pub define_line: Regex,
    /// `#define NAME` anywhere, for building the defined-name set.
    pub define_any: Regex,
    /// `#undef NAME` anywhere.
    pub undef_any: Regex,
    /// Function-like `#define NAME(params) body` on one line.
    pub define_with_params: Regex,
}

impl MacroPatterns {
    pub fn new() -> Self {
        Self {
            define_line: Regex::new(r"^\s*#\s*define\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap(),
            define_any: Regex::new(r"#\s*define\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap(),
            undef_any: Regex::new(r"#\s*undef\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap(),
            define_with_params: Regex::new(
                r"#define\s+([a-zA-Z_][a-zA-Z0-9_]*)\(([^)]*)\)\s+(.+)",
            )
            .unwrap(),
        }
    }
}

/// Run every macro check over `content`, returning the repaired text and
/// the number of checks that found something.
pub(crate) fn fix_macro_issues(
    label: &str,
    content: &str,
    patterns: &MacroPatterns,
) -> (String, usize) {
    let budget = TimeBudget::new(FILE_BUDGET);
    let mut fixed = content.to_string();
    let mut issues = 0;

    if !budget.exhausted() {
        if let Some(repaired) = wrap_long_defines(label, &fixed) {
            fixed = repaired;
            issues += 1;
        }
    }
    if !budget.exhausted() {
        if let Some(repaired) = remove_duplicate_defines(label, &fixed, patterns) {
            fixed = repaired;
            issues += 1;
        }
    }
    if !budget.exhausted() {
        if let Some(repaired) = comment_orphan_undefs(label, &fixed, patterns) {
            fixed = repaired;
            issues += 1;
        }
    }
    if !budget.exhausted() {
        if let Some(repaired) = balance_directives(label, &fixed) {
            fixed = repaired;
            issues += 1;
        }
    }
    if !budget.exhausted() {
        warn_unparenthesized_params(label, &fixed, patterns);
    }

    if budget.exhausted() {
        warn!("Macro issue checking for {} timed out. Some issues may not have been fixed.", label);
    }

    (fixed, issues)
}

/// Split overlong `#define` lines missing a continuation backslash,
/// carrying the cut text onto an indented continuation line.
fn wrap_long_defines(label: &str, content: &str) -> Option<String> {
    let mut wrapped: Vec<String> = Vec::new();
    let mut changed = false;

    for line in content.split('\n') {
        if line.starts_with("#define")
            && line.chars().count() > DEFINE_WRAP_COLUMN + 1
            && !line.ends_with('\\')
        {
            warn!("Long macro definition without continuation in {}", label);
            let split = line
                .char_indices()
                .nth(DEFINE_WRAP_COLUMN)
                .map_or(line.len(), |(i, _)| i);
            wrapped.push(format!("{} \\", &line[..split]));
            wrapped.push(format!("    {}", line[split..].trim_start()));
            changed = true;
        } else {
            wrapped.push(line.to_string());
        }
    }

    if changed {
        Some(wrapped.join("\n"))
    } else {
        None
    }
}

/// Comment out repeated `#define`s of the same name, leaving the first.
///
/// Defines sitting inside their own `#ifndef` guard are the guard idiom,
/// not a redefinition; once a name has been seen guarded it is never
/// reported again anywhere in the file.
fn remove_duplicate_defines(label: &str, content: &str, patterns: &MacroPatterns) -> Option<String> {
    let mut tracker = DirectiveTracker::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut guarded: BTreeSet<String> = BTreeSet::new();
    let mut out: Vec<String> = Vec::new();
    let mut changed = false;

    for (i, line) in content.split('\n').enumerate() {
        tracker.observe(line, i);

        if let Some(caps) = patterns.define_line.captures(line) {
            let name = &caps[1];
            if tracker.in_guard(name) {
                guarded.insert(name.to_string());
            } else if !guarded.contains(name) {
                if seen.contains(name) {
                    warn!("Macro '{}' is redefined at line {} in {}", name, i + 1, label);
                    out.push(format!("/* Duplicate definition removed: {} */", line));
                    changed = true;
                    continue;
                }
                seen.insert(name.to_string());
            }
        }
        out.push(line.to_string());
    }

    if changed {
        Some(out.join("\n"))
    } else {
        None
    }
}

/// Comment out `#undef`s whose name is never defined in the file.
fn comment_orphan_undefs(label: &str, content: &str, patterns: &MacroPatterns) -> Option<String> {
    let defined: BTreeSet<&str> = patterns
        .define_any
        .find_iter(content)
        .filter_map(|m| m.as_str().split_whitespace().last())
        .collect();

    let orphans: Vec<(usize, usize, &str)> = patterns
        .undef_any
        .find_iter(content)
        .filter_map(|m| {
            let name = m.as_str().split_whitespace().last()?;
            // undefs already sitting in a comment stay as they are
            let line_start = content[..m.start()].rfind('\n').map_or(0, |i| i + 1);
            let prefix = content[line_start..m.start()].trim_start();
            if defined.contains(name) || prefix.starts_with("//") || prefix.starts_with("/*") {
                None
            } else {
                Some((m.start(), m.end(), name))
            }
        })
        .collect();
    if orphans.is_empty() {
        return None;
    }

    let mut fixed = content.to_string();
    // back to front, so earlier spans stay valid
    for (start, end, name) in orphans.into_iter().rev() {
        warn!("#undef for '{}' without corresponding #define in {}", name, label);
        let span = content[start..end].to_string();
        fixed.replace_range(
            start..end,
            &format!("/* Commented out as no matching #define found: {} */", span),
        );
    }
    Some(fixed)
}

/// Repair directive nesting: comment out `#endif`s that close nothing and
/// append one for every directive still open at end of file.
fn balance_directives(label: &str, content: &str) -> Option<String> {
    let mut tracker = DirectiveTracker::new();
    for (i, line) in content.split('\n').enumerate() {
        tracker.observe(line, i);
    }
    if tracker.depth() == 0 && tracker.unmatched_closes().is_empty() {
        return None;
    }

    warn!("Unbalanced preprocessor directives in {}", label);
    debug!("Missing #endif directives: {}", tracker.depth());
    debug!("Extra #endif directives: {}", tracker.unmatched_closes().len());

    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    for &i in tracker.unmatched_closes().iter().rev() {
        lines[i] = format!("/* Extra #endif removed: {} */", lines[i]);
    }
    for open in tracker.open_stack() {
        lines.push(format!(
            "#endif /* Auto-added to match {} at line {} */",
            open.text(),
            open.line + 1
        ));
    }
    Some(lines.join("\n"))
}

/// Flag macro parameters used in arithmetic without parentheses. Fixing
/// this safely needs semantic context, so it only warns.
fn warn_unparenthesized_params(label: &str, content: &str, patterns: &MacroPatterns) {
    for caps in patterns.define_with_params.captures_iter(content) {
        let name = &caps[1];
        let params = &caps[2];
        let body = &caps[3];

        for param in params.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let escaped = regex::escape(param);
            let bare = format!(r"[+\-*/&|^<>]=?\s*{}\b|\b{}\s*[+\-*/&|^<>]=?", escaped, escaped);
            let used_bare = Regex::new(&bare).map(|re| re.is_match(body)).unwrap_or(false);
            let wrapped = format!(r"\({}\)", escaped);
            let used_wrapped = Regex::new(&wrapped).map(|re| re.is_match(body)).unwrap_or(false);
            if used_bare && !used_wrapped {
                warn!(
                    "Macro '{}' may need parentheses around parameter '{}' in {}",
                    name, param, label
                );
            }
        }
    }
}
