//! Run configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Options controlling one split run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Monolithic source file to split
    pub input: PathBuf,

    /// Destination directory for the generated tree
    pub output_dir: PathBuf,

    /// Run the verification/repair pass after writing
    pub verify: bool,

    /// Exit non-zero when verification finds issues
    pub strict: bool,

    /// Wall-clock budget for the whole run, in seconds
    pub max_time_secs: u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sod.c"),
            output_dir: PathBuf::from("."),
            verify: true,
            strict: false,
            max_time_secs: 300,
        }
    }
}

impl SplitOptions {
    /// Directory for generated implementation units.
    pub fn src_dir(&self) -> PathBuf {
        self.output_dir.join("src").join("sod")
    }

    /// Directory for generated per-module headers.
    pub fn include_dir(&self) -> PathBuf {
        self.output_dir.join("include").join("sod")
    }

    /// Path of the umbrella header including every module.
    pub fn umbrella_header(&self) -> PathBuf {
        self.output_dir.join("include").join("sod.h")
    }

    pub fn budget(&self) -> TimeBudget {
        TimeBudget::new(Duration::from_secs(self.max_time_secs))
    }
}

/// Wall-clock budget checked between discrete phases.
///
/// Exhaustion never aborts work already in flight; callers consult the
/// budget before starting the next check or file and skip with a
/// warning when nothing is left.
#[derive(Debug, Clone)]
pub struct TimeBudget {
    started: Instant,
    limit: Duration,
}

impl TimeBudget {
    pub fn new(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started.elapsed())
    }

    pub fn exhausted(&self) -> bool {
        self.started.elapsed() >= self.limit
    }

    /// Fraction of the budget already spent, 0.0 to 1.0 and beyond.
    pub fn fraction_used(&self) -> f64 {
        if self.limit.is_zero() {
            return 1.0;
        }
        self.started.elapsed().as_secs_f64() / self.limit.as_secs_f64()
    }
}
