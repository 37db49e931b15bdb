//! Text-level checks: string literals, braces, terminators, header names.
//!
//! Each check inspects the whole file text and repairs in place where a
//! safe mechanical fix exists. The checks run under a per-file wall-clock
//! budget; when it runs out the remaining checks are skipped with a
//! warning rather than failing the run.

use std::time::Duration;

use regex::Regex;
use sodsplit_core::TimeBudget;
use tracing::warn;

const FILE_BUDGET: Duration = Duration::from_secs(10);

/// Maximum semicolon insertions per file, to bound pathological input.
const MAX_SEMICOLON_FIXES: usize = 50;

pub(crate) struct TextPatterns {
    /// `typedef struct`/`typedef enum` block with its trailing name.
    pub struct_enum_def: Regex,
    /// `} name;E;` artifact left by enum extraction.
    pub enum_tail_e: Regex,
    /// `} name;<junk>;` with junk free of separators.
    pub enum_tail_multi: Regex,
    /// Same, tolerating semicolons inside the junk.
    pub enum_tail_lazy: Regex,
    /// Case-sensitive `<Windows.h>` include.
    pub windows_include: Regex,
}

impl TextPatterns {
    pub fn new() -> Self {
        Self {
            struct_enum_def: Regex::new(
                r"(typedef\s+struct|typedef\s+enum)[^;{]*\{[^}]*\}\s*([a-zA-Z_][a-zA-Z0-9_]*)",
            )
            .unwrap(),
            enum_tail_e: Regex::new(r"\}\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*;E;").unwrap(),
            enum_tail_multi: Regex::new(r"\}\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*;[^;{}\n]*;").unwrap(),
            enum_tail_lazy: Regex::new(r"\}\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*;[^{}\n]*?;").unwrap(),
            windows_include: Regex::new(r"#include\s+<Windows\.h>").unwrap(),
        }
    }
}

/// Run every text check over `content`, returning the repaired text and
/// the number of checks that found something.
pub(crate) fn fix_common_issues(
    label: &str,
    content: &str,
    patterns: &TextPatterns,
) -> (String, usize) {
    let budget = TimeBudget::new(FILE_BUDGET);
    let mut fixed = content.to_string();
    let mut issues = 0;

    if !budget.exhausted() && fix_unterminated_strings(label, &mut fixed) {
        issues += 1;
    }
    if !budget.exhausted() && fix_brace_balance(label, &mut fixed) {
        issues += 1;
    }
    if !budget.exhausted() && fix_missing_semicolons(label, &mut fixed, patterns) {
        issues += 1;
    }
    if !budget.exhausted() && fix_enum_terminators(label, &mut fixed, patterns) {
        issues += 1;
    }
    if !budget.exhausted() && fix_windows_include(label, &mut fixed, patterns) {
        issues += 1;
    }

    if budget.exhausted() {
        warn!("Processing of {} timed out. Some issues may not have been fixed.", label);
    }

    (fixed, issues)
}

fn suspicious_quote_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.starts_with("//")
        && !trimmed.starts_with("/*")
        && line.matches('"').count() % 2 != 0
}

/// Append a closing quote to lines with an odd double-quote count.
fn fix_unterminated_strings(label: &str, fixed: &mut String) -> bool {
    let suspicious = fixed.split('\n').filter(|line| suspicious_quote_line(line)).count();
    if suspicious == 0 {
        return false;
    }
    warn!("Found {} potentially unterminated string literals in {}", suspicious, label);

    let repaired: Vec<String> = fixed
        .split('\n')
        .map(|line| {
            if suspicious_quote_line(line) {
                format!("{}\"", line)
            } else {
                line.to_string()
            }
        })
        .collect();
    *fixed = repaired.join("\n");
    true
}

/// Net open braces over the text, skipping string literals and comments.
/// Comment state survives line breaks.
fn brace_balance(content: &str) -> i64 {
    let mut in_comment = false;
    let mut balance: i64 = 0;

    for line in content.split('\n') {
        let bytes = line.as_bytes();
        let mut j = 0;
        while j < bytes.len() {
            if bytes[j] == b'"' && (j == 0 || bytes[j - 1] != b'\\') {
                j += 1;
                while j < bytes.len() && (bytes[j] != b'"' || bytes[j - 1] == b'\\') {
                    j += 1;
                }
                if j < bytes.len() {
                    j += 1;
                }
                continue;
            }
            if j + 1 < bytes.len() && bytes[j] == b'/' && bytes[j + 1] == b'/' {
                break;
            }
            if j + 1 < bytes.len() && bytes[j] == b'/' && bytes[j + 1] == b'*' {
                in_comment = true;
                j += 2;
                continue;
            }
            if in_comment && j + 1 < bytes.len() && bytes[j] == b'*' && bytes[j + 1] == b'/' {
                in_comment = false;
                j += 2;
                continue;
            }
            if in_comment {
                j += 1;
                continue;
            }
            match bytes[j] {
                b'{' => balance += 1,
                b'}' => balance -= 1,
                _ => {}
            }
            j += 1;
        }
    }

    balance
}

/// Append missing closing braces, or comment out trailing extras working
/// backwards from the end of the file.
fn fix_brace_balance(label: &str, fixed: &mut String) -> bool {
    let balance = brace_balance(fixed);
    if balance == 0 {
        return false;
    }
    warn!("Unbalanced braces in {} (balance {})", label, balance);

    if balance > 0 {
        fixed.push('\n');
        for _ in 0..balance {
            fixed.push('}');
        }
        fixed.push_str(" /* Auto-added to balance braces */\n");
    } else {
        let mut extra = (-balance) as usize;
        let mut lines: Vec<String> = fixed.split('\n').map(str::to_string).collect();
        for line in lines.iter_mut().rev() {
            if extra == 0 {
                break;
            }
            if line.trim_start().starts_with("//") || line.contains("/*") {
                continue;
            }
            if let Some(pos) = line.rfind('}') {
                line.replace_range(pos..pos + 1, "/* Extra closing brace removed */");
                extra -= 1;
            }
        }
        *fixed = lines.join("\n");
    }
    true
}

/// Insert the terminating `;` after `typedef struct`/`typedef enum`
/// blocks whose trailing name is not followed by one.
fn fix_missing_semicolons(label: &str, fixed: &mut String, patterns: &TextPatterns) -> bool {
    let mut insert_at: Vec<usize> = Vec::new();
    for caps in patterns.struct_enum_def.captures_iter(fixed) {
        if let Some(name) = caps.get(2) {
            let rest = &fixed[name.end()..];
            if !rest.trim_start().starts_with(';') {
                insert_at.push(name.end());
            }
        }
        if insert_at.len() >= MAX_SEMICOLON_FIXES {
            break;
        }
    }
    if insert_at.is_empty() {
        return false;
    }
    warn!("Found {} struct/enum definitions without semicolons in {}", insert_at.len(), label);

    // back to front, so earlier offsets stay valid
    for pos in insert_at.into_iter().rev() {
        fixed.insert(pos, ';');
    }
    true
}

/// Normalize malformed enum terminators such as `} name;E;`.
fn fix_enum_terminators(label: &str, fixed: &mut String, patterns: &TextPatterns) -> bool {
    let e_count = patterns.enum_tail_e.find_iter(fixed).count();
    let multi_count = patterns.enum_tail_multi.find_iter(fixed).count();

    let repaired = patterns.enum_tail_e.replace_all(fixed, "} ${1};");
    let repaired = patterns.enum_tail_multi.replace_all(&repaired, "} ${1};");
    let repaired = patterns.enum_tail_lazy.replace_all(&repaired, "} ${1};").into_owned();
    *fixed = repaired;

    if e_count > 0 {
        warn!("Found {} malformed enum definitions in {}", e_count, label);
    }
    if multi_count > 0 {
        warn!("Found {} enums with multiple semicolons in {}", multi_count, label);
    }
    e_count > 0 || multi_count > 0
}

/// Rewrite the Windows-cased `<Windows.h>` include into a guarded
/// lowercase form that non-Windows toolchains tolerate.
fn fix_windows_include(label: &str, fixed: &mut String, patterns: &TextPatterns) -> bool {
    if !fixed.contains("Windows.h") {
        return false;
    }
    warn!("Found Windows.h include in {}", label);
    let repaired = patterns
        .windows_include
        .replace_all(fixed, "#ifdef _WIN32\n#include <windows.h>\n#endif")
        .into_owned();
    *fixed = repaired;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_odd_quotes_get_closed() {
        let mut content = String::from("char *s = \"abc;\nint x = 1;\n// \"half comment\nprintf(\"ok\");");
        assert!(fix_unterminated_strings("t.c", &mut content));
        let lines: Vec<&str> = content.split('\n').collect();
        assert_eq!(lines[0], "char *s = \"abc;\"");
        assert_eq!(lines[1], "int x = 1;");
        // comment lines are never touched
        assert_eq!(lines[2], "// \"half comment");
        assert_eq!(lines[3], "printf(\"ok\");");
    }

    #[test]
    fn test_brace_balance_ignores_strings_and_comments() {
        assert_eq!(brace_balance("int f() { return 0; }"), 0);
        assert_eq!(brace_balance("char *s = \"{{{\";"), 0);
        assert_eq!(brace_balance("/* { */ int x; // }\n"), 0);
        assert_eq!(brace_balance("/* spans\n a { line */ }"), -1);
        assert_eq!(brace_balance("int f() {\n  if (a) {\n}"), 1);
    }

    #[test]
    fn test_missing_braces_appended() {
        let mut content = String::from("int f() {\n  if (a) {\n    g();\n");
        assert!(fix_brace_balance("t.c", &mut content));
        assert!(content.ends_with("}} /* Auto-added to balance braces */\n"));
        assert_eq!(brace_balance(&content), 0);
    }

    #[test]
    fn test_extra_brace_commented_out() {
        let mut content = String::from("int f() {\n  return 0;\n}\n}\n");
        assert!(fix_brace_balance("t.c", &mut content));
        assert_eq!(brace_balance(&content), 0);
        assert!(content.contains("/* Extra closing brace removed */"));
        // the function's own closing brace survives
        assert!(content.contains("  return 0;\n}"));
    }

    #[test]
    fn test_semicolon_inserted_after_typedef_block() {
        let patterns = TextPatterns::new();
        let mut content = String::from("typedef struct { int x; } point\n\nint y;");
        assert!(fix_missing_semicolons("t.c", &mut content, &patterns));
        assert!(content.starts_with("typedef struct { int x; } point;\n"));

        // already terminated: untouched
        let mut ok = String::from("typedef enum { A } e;\n");
        assert!(!fix_missing_semicolons("t.c", &mut ok, &patterns));
        assert_eq!(ok, "typedef enum { A } e;\n");
    }

    #[test]
    fn test_enum_tail_artifacts_removed() {
        let patterns = TextPatterns::new();
        let mut content = String::from("typedef enum { A, B } kind;E;\n");
        assert!(fix_enum_terminators("t.c", &mut content, &patterns));
        assert_eq!(content, "typedef enum { A, B } kind;\n");

        let mut content = String::from("} tag; stray tokens;\n");
        assert!(fix_enum_terminators("t.c", &mut content, &patterns));
        assert_eq!(content, "} tag;\n");
    }

    #[test]
    fn test_windows_include_rewritten() {
        let patterns = TextPatterns::new();
        let mut content = String::from("#include <Windows.h>\nint main(void) { return 0; }\n");
        assert!(fix_windows_include("t.c", &mut content, &patterns));
        assert!(content.starts_with("#ifdef _WIN32\n#include <windows.h>\n#endif\n"));
        assert!(!content.contains("Windows.h"));
    }

    #[test]
    fn test_clean_content_passes_every_check() {
        let patterns = TextPatterns::new();
        let clean = "#include <stdio.h>\n\nint main(void) {\n    printf(\"hi\\n\");\n    return 0;\n}\n";
        let (fixed, issues) = fix_common_issues("t.c", clean, &patterns);
        assert_eq!(issues, 0);
        assert_eq!(fixed, clean);
    }
}
