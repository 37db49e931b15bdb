//! Post-write verification for the generated source tree.
//!
//! Walks every `.c` and `.h` file under the output directory and runs a
//! battery of integrity checks: directive balance, unterminated strings,
//! brace balance, missing semicolons after type definitions, enum
//! terminator artifacts, raw `Windows.h` includes, overlong macro
//! definitions, duplicate defines and orphan `#undef`s. Checks repair
//! what they safely can and warn about the rest; each file gets one
//! write at the end, after all repairs have been threaded through.

mod macros;
mod text;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sodsplit_core::directives::DirectiveBalance;
use sodsplit_core::{Result, SplitOptions};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of a verification pass over the output tree
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct VerifyReport {
    /// Files inspected
    pub files_checked: usize,
    /// Checks that found something, summed over all files
    pub issues_found: usize,
    /// Files rewritten with repairs
    pub fixes_applied: usize,
}

impl VerifyReport {
    pub fn has_issues(&self) -> bool {
        self.issues_found > 0
    }
}

/// Runs the integrity checks over a generated tree.
pub struct Verifier {
    text_patterns: text::TextPatterns,
    macro_patterns: macros::MacroPatterns,
}

impl Verifier {
    pub fn new() -> Self {
        Self {
            text_patterns: text::TextPatterns::new(),
            macro_patterns: macros::MacroPatterns::new(),
        }
    }

    /// Check and repair every generated source file under the output
    /// directory.
    pub fn verify_tree(&self, opts: &SplitOptions) -> Result<VerifyReport> {
        info!("Verifying output files");

        let mut paths: Vec<PathBuf> = WalkDir::new(&opts.output_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                matches!(path.extension().and_then(|ext| ext.to_str()), Some("c") | Some("h"))
            })
            .collect();
        paths.sort();

        let mut report = VerifyReport::default();
        for path in &paths {
            let (issues, wrote) = self.verify_file(path)?;
            report.files_checked += 1;
            report.issues_found += issues;
            if wrote {
                report.fixes_applied += 1;
            }
        }

        info!(
            "Verification complete: {} files checked, {} issues found",
            report.files_checked, report.issues_found
        );
        Ok(report)
    }

    /// Run all checks over one file, writing it back once if anything
    /// was repaired. Returns the issue count and whether a write
    /// happened.
    fn verify_file(&self, path: &Path) -> Result<(usize, bool)> {
        let original = fs::read_to_string(path)?;
        let label = path.display().to_string();
        let mut content = original.clone();
        let mut issues = 0;

        let balance = DirectiveBalance::of(&content);
        if balance.missing_closes() > 0 {
            warn!(
                "Unbalanced preprocessor directives in {} ({} opens, {} closes)",
                label, balance.opens, balance.closes
            );
            for _ in 0..balance.missing_closes() {
                content.push_str("\n#endif /* Auto-added to balance directives */\n");
            }
            info!("Fixed by adding {} #endif directives", balance.missing_closes());
            issues += 1;
        } else if balance.excess_closes() > 0 {
            // the macro pass comments the strays out; here it is only counted
            warn!("More #endif directives than #if directives. Manual inspection needed.");
            issues += 1;
        }

        let (content, text_issues) = text::fix_common_issues(&label, &content, &self.text_patterns);
        issues += text_issues;
        let (content, macro_issues) =
            macros::fix_macro_issues(&label, &content, &self.macro_patterns);
        issues += macro_issues;

        let wrote = content != original;
        if wrote {
            fs::write(path, &content)?;
            debug!("Fixed issues in {}", label);
        }
        Ok((issues, wrote))
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}
