//! Risk checks run before deleting.

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use dirscope_core::Entry;
use dirscope_core::classify::GIB;

/// Entries above this size are flagged.
pub const VERY_LARGE_THRESHOLD: u64 = 10 * GIB;

/// Entries modified more recently than this are flagged.
pub const RECENT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

const IMPORTANT_DIRECTORIES: &[&str] =
    &["documents", "desktop", "downloads", "pictures", "videos", "music"];

/// Reason to think twice before deleting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskWarning {
    SystemEntry,
    VeryLarge,
    ImportantDirectory,
    RecentlyModified,
}

impl fmt::Display for RiskWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SystemEntry => "This appears to be a system file or folder",
            Self::VeryLarge => "This is a very large item (>10GB)",
            Self::ImportantDirectory => "This appears to be an important user directory",
            Self::RecentlyModified => "This item was modified recently (within 24 hours)",
        };
        f.write_str(text)
    }
}

/// Outcome of validating one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    /// Always true; the host enforces actual restrictions.
    pub can_delete: bool,
    pub warnings: Vec<RiskWarning>,
}

impl Validation {
    /// More than one warning applies.
    pub fn is_high_risk(&self) -> bool {
        self.warnings.len() > 1
    }
}

/// Check one entry against the risk rules, relative to `now`.
pub fn validate_entry(entry: &Entry, now: SystemTime) -> Validation {
    let mut warnings = Vec::new();

    if entry.metadata.system {
        warnings.push(RiskWarning::SystemEntry);
    }
    if entry.size > VERY_LARGE_THRESHOLD {
        warnings.push(RiskWarning::VeryLarge);
    }
    if entry.is_dir() {
        let name = entry.name.to_lowercase();
        if IMPORTANT_DIRECTORIES.iter().any(|d| name.contains(d)) {
            warnings.push(RiskWarning::ImportantDirectory);
        }
    }
    if let Some(modified) = entry.last_modified {
        let recent = now
            .duration_since(modified)
            .map(|age| age < RECENT_WINDOW)
            .unwrap_or(true);
        if recent {
            warnings.push(RiskWarning::RecentlyModified);
        }
    }

    Validation {
        can_delete: true,
        warnings,
    }
}

/// Entries partitioned by risk.
#[derive(Debug, Clone, Default)]
pub struct BatchValidation<'a> {
    pub safe: Vec<(&'a Entry, Validation)>,
    /// Exactly one warning.
    pub warnings: Vec<(&'a Entry, Validation)>,
    pub high_risk: Vec<(&'a Entry, Validation)>,
    pub total_size: u64,
}

/// Validate a batch and partition it into safe, warned and high-risk entries.
pub fn validate_entries<'a>(entries: &[&'a Entry], now: SystemTime) -> BatchValidation<'a> {
    let mut batch = BatchValidation::default();
    for &entry in entries {
        let validation = validate_entry(entry, now);
        batch.total_size += entry.size;
        if validation.is_high_risk() {
            batch.high_risk.push((entry, validation));
        } else if !validation.warnings.is_empty() {
            batch.warnings.push((entry, validation));
        } else {
            batch.safe.push((entry, validation));
        }
    }
    batch
}
