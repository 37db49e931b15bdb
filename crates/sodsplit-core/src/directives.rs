//! Preprocessor directive scanner.
//!
//! One line-oriented state machine shared by extraction, synthesis and
//! verification, so open/close bookkeeping is implemented exactly once.
//! The scanner understands `#if`, `#ifdef`, `#ifndef`, `#elif`, `#else`
//! and `#endif`; everything else on a `#` line is somebody else's
//! business.

/// Conditional directive recognized on a source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    If,
    Ifdef,
    Ifndef,
    Elif,
    Else,
    Endif,
}

impl DirectiveKind {
    /// Whether this directive opens a new nesting level.
    pub fn opens(self) -> bool {
        matches!(self, DirectiveKind::If | DirectiveKind::Ifdef | DirectiveKind::Ifndef)
    }

    /// Whether this directive continues the current level.
    pub fn continues(self) -> bool {
        matches!(self, DirectiveKind::Elif | DirectiveKind::Else)
    }
}

/// Parse the conditional directive on one line, returning its kind and
/// the condition text after the keyword. Bare `endif`/`else` words
/// without a `#` are not directives.
pub fn parse_directive(line: &str) -> Option<(DirectiveKind, &str)> {
    let rest = line.trim_start().strip_prefix('#')?.trim_start();
    // longest keywords first: `if` is a prefix of `ifdef` and `ifndef`
    let (kind, tail) = if let Some(t) = rest.strip_prefix("ifndef") {
        (DirectiveKind::Ifndef, t)
    } else if let Some(t) = rest.strip_prefix("ifdef") {
        (DirectiveKind::Ifdef, t)
    } else if let Some(t) = rest.strip_prefix("if") {
        (DirectiveKind::If, t)
    } else if let Some(t) = rest.strip_prefix("elif") {
        (DirectiveKind::Elif, t)
    } else if let Some(t) = rest.strip_prefix("else") {
        (DirectiveKind::Else, t)
    } else if let Some(t) = rest.strip_prefix("endif") {
        (DirectiveKind::Endif, t)
    } else {
        return None;
    };
    if tail.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((kind, tail.trim()))
}

/// Open vs. close directive totals over a block of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectiveBalance {
    pub opens: usize,
    pub closes: usize,
}

impl DirectiveBalance {
    /// Count opening and closing directives line by line.
    pub fn of(text: &str) -> Self {
        let mut balance = Self::default();
        for line in text.lines() {
            if let Some((kind, _)) = parse_directive(line) {
                if kind.opens() {
                    balance.opens += 1;
                } else if kind == DirectiveKind::Endif {
                    balance.closes += 1;
                }
            }
        }
        balance
    }

    pub fn missing_closes(&self) -> usize {
        self.opens.saturating_sub(self.closes)
    }

    pub fn excess_closes(&self) -> usize {
        self.closes.saturating_sub(self.opens)
    }

    pub fn is_balanced(&self) -> bool {
        self.opens == self.closes
    }
}

/// A directive still open on the tracker stack
#[derive(Debug, Clone)]
pub struct OpenDirective {
    pub kind: DirectiveKind,
    /// Condition text after the keyword, e.g. `FOO` or `defined(_WIN32)`
    pub condition: String,
    /// Zero-based line the directive appeared on
    pub line: usize,
}

impl OpenDirective {
    /// Reconstructed directive text for diagnostics.
    pub fn text(&self) -> String {
        let keyword = match self.kind {
            DirectiveKind::If => "#if",
            DirectiveKind::Ifdef => "#ifdef",
            DirectiveKind::Ifndef => "#ifndef",
            DirectiveKind::Elif => "#elif",
            DirectiveKind::Else => "#else",
            DirectiveKind::Endif => "#endif",
        };
        if self.condition.is_empty() {
            keyword.to_string()
        } else {
            format!("{} {}", keyword, self.condition)
        }
    }
}

/// Stack-based nesting tracker.
///
/// Feed lines in order; the tracker maintains the stack of unclosed
/// open directives and the positions of `#endif`s that closed nothing.
#[derive(Debug, Default)]
pub struct DirectiveTracker {
    stack: Vec<OpenDirective>,
    unmatched_closes: Vec<usize>,
}

impl DirectiveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one line, returning the directive found on it, if any.
    pub fn observe(&mut self, line: &str, line_no: usize) -> Option<DirectiveKind> {
        let (kind, condition) = parse_directive(line)?;
        if kind.opens() {
            self.stack.push(OpenDirective {
                kind,
                condition: condition.to_string(),
                line: line_no,
            });
        } else if kind == DirectiveKind::Endif && self.stack.pop().is_none() {
            self.unmatched_closes.push(line_no);
        }
        Some(kind)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn open_stack(&self) -> &[OpenDirective] {
        &self.stack
    }

    pub fn unmatched_closes(&self) -> &[usize] {
        &self.unmatched_closes
    }

    /// Whether any enclosing directive is an `#ifndef name` guard.
    /// Redefinitions inside their own guard are the guard idiom, not a
    /// conflict, including defines sitting in an `#else` branch of the
    /// guarded region.
    pub fn in_guard(&self, name: &str) -> bool {
        self.stack.iter().any(|open| {
            open.kind == DirectiveKind::Ifndef
                && open.condition.split_whitespace().next() == Some(name)
        })
    }
}
