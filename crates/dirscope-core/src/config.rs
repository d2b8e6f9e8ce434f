//! Scan configuration types.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for scanning operations.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanOptions {
    /// Maximum directory depth below the root; deeper subtrees are omitted.
    #[builder(default = "50")]
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Include hidden entries (starting with `.`).
    #[builder(default = "false")]
    #[serde(default)]
    pub include_hidden: bool,

    /// Leave out entries matching the temp-file heuristic.
    #[builder(default = "false")]
    #[serde(default)]
    pub skip_temp_files: bool,

    /// Safety cap on the number of counted items.
    #[builder(default = "1_000_000")]
    #[serde(default = "default_max_files")]
    pub max_files: u64,

    /// Minimum time between two progress updates.
    #[builder(default = "Duration::from_millis(100)")]
    #[serde(default = "default_progress_interval")]
    pub progress_interval: Duration,

    /// Yield to the scheduler after this many processed entries.
    #[builder(default = "50")]
    #[serde(default = "default_yield_every")]
    pub yield_every: u64,

    /// Check read/write permissions for every entry.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub check_permissions: bool,
}

fn default_max_depth() -> u32 {
    50
}

fn default_max_files() -> u64 {
    1_000_000
}

fn default_progress_interval() -> Duration {
    Duration::from_millis(100)
}

fn default_yield_every() -> u64 {
    50
}

fn default_true() -> bool {
    true
}

impl ScanOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_files == Some(0) {
            return Err("max_files must be greater than zero".to_string());
        }
        if self.yield_every == Some(0) {
            return Err("yield_every must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl ScanOptions {
    /// Create a new scan options builder.
    pub fn builder() -> ScanOptionsBuilder {
        ScanOptionsBuilder::default()
    }

    /// Check if a hidden entry should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && crate::classify::is_hidden(name)
    }

    /// Check if an entry should be left out of the scan.
    pub fn should_skip(&self, name: &str, path: &str) -> bool {
        self.should_skip_hidden(name)
            || (self.skip_temp_files && crate::classify::is_temp_file(name, path))
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            include_hidden: false,
            skip_temp_files: false,
            max_files: default_max_files(),
            progress_interval: default_progress_interval(),
            yield_every: default_yield_every(),
            check_permissions: true,
        }
    }
}
