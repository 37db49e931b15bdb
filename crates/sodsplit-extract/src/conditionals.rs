//! Preprocessor conditional block extraction
//!
//! Conditionals are matched at line granularity: every directive line is
//! collected first, then openers are paired with their closing `#endif` by a
//! depth counter over that stream. A completed block keeps one line of
//! context on each side. An opener that never closes swallows the rest of
//! the file and gets a repair `#endif`, and scanning stops there since every
//! later directive sits inside the runaway block.

use sodsplit_core::directives::{parse_directive, DirectiveKind};
use sodsplit_core::{Element, ElementKind};
use tracing::warn;

use crate::deps;
use crate::patterns::ElementPatterns;

/// Extract conditional compilation blocks.
pub(crate) fn extract(patterns: &ElementPatterns, source: &str) -> Vec<Element> {
    // split('\n') rather than lines() so byte offsets stay exact
    let lines: Vec<&str> = source.split('\n').collect();
    let mut line_starts = Vec::with_capacity(lines.len());
    let mut off = 0;
    for line in &lines {
        line_starts.push(off);
        off += line.len() + 1;
    }

    let mut dirs: Vec<(usize, DirectiveKind, &str)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some((kind, cond)) = parse_directive(line) {
            dirs.push((i, kind, cond));
        }
    }

    let mut out = Vec::new();
    let mut i = 0;
    while i < dirs.len() {
        let (start_line, kind, cond) = dirs[i];
        if !kind.opens() {
            i += 1;
            continue;
        }

        let mut stack = 1usize;
        let mut multipart = false;
        let mut end_line = None;
        let mut j = i + 1;
        while j < dirs.len() {
            let (ln, next, _) = dirs[j];
            if next.opens() {
                stack += 1;
            } else if next == DirectiveKind::Endif {
                stack -= 1;
            }
            if matches!(next, DirectiveKind::Elif | DirectiveKind::Else) {
                multipart = true;
            }
            if stack == 0 {
                end_line = Some(ln);
                break;
            }
            j += 1;
        }

        match end_line {
            Some(end_line) => {
                let context_start = start_line.saturating_sub(1);
                let context_end = (end_line + 1).min(lines.len() - 1);
                let content = lines[context_start..=context_end].join("\n");
                let start = line_starts[context_start];
                let end = line_starts[context_end] + lines[context_end].len();

                let name = if multipart {
                    let cond = if cond.is_empty() { "condition" } else { cond };
                    format!("multipart_conditional_{}", cond)
                } else {
                    "conditional".to_string()
                };

                let mut elem = Element::new(name, ElementKind::Conditional, content, start, end);
                elem.deps = deps::scan(patterns, &elem.content);
                out.push(elem);

                i = j + 1;
            }
            None => {
                warn!(
                    "Unterminated conditional starting at line {}: {}",
                    start_line + 1,
                    lines[start_line].trim()
                );

                let mut content = lines[start_line..].join("\n");
                content.push_str("\n#endif /* Auto-added to fix unterminated conditional */\n");
                let mut elem = Element::new(
                    "conditional_fixed",
                    ElementKind::Conditional,
                    content,
                    line_starts[start_line],
                    source.len(),
                );
                elem.deps = deps::scan(patterns, &elem.content);
                out.push(elem);
                break;
            }
        }
    }

    out
}
