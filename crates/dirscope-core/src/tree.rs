//! Scan result container and progress counters.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScanOptions;
use crate::error::ScanWarning;
use crate::node::Entry;

/// Counters maintained by the scanner during one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Items found by the counting phase.
    pub total_items: u64,
    /// Items processed by the scanning phase so far.
    pub scanned_items: u64,
    /// Bytes of readable files scanned so far.
    pub total_size: u64,
    /// Files found by the counting phase.
    pub file_count: u64,
    /// Folders found by the counting phase.
    pub folder_count: u64,
    /// Time since the scan started.
    pub elapsed: Duration,
    /// Items per second.
    pub speed: u64,
}

impl ScanProgress {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanned share of the counted total, 0-100.
    pub fn percentage(&self) -> u8 {
        if self.total_items == 0 {
            return 0;
        }
        let pct = (self.scanned_items as f64 / self.total_items as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }
}

/// Immutable snapshot of one completed scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root directory entry.
    pub root: Entry,

    /// Final counters.
    pub progress: ScanProgress,

    /// Wall-clock duration of the scan.
    pub scan_time: Duration,

    /// When the scan finished.
    pub timestamp: DateTime<Utc>,

    /// Options the scan ran with.
    pub options: ScanOptions,

    /// Per-entry failures absorbed during the scan.
    pub warnings: Vec<ScanWarning>,
}

impl ScanResult {
    /// Create a new scan result stamped with the current time.
    pub fn new(
        root: Entry,
        progress: ScanProgress,
        scan_time: Duration,
        options: ScanOptions,
        warnings: Vec<ScanWarning>,
    ) -> Self {
        Self {
            root,
            progress,
            scan_time,
            timestamp: Utc::now(),
            options,
            warnings,
        }
    }

    /// Get the total size of the tree.
    pub fn total_size(&self) -> u64 {
        self.root.size
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let mut progress = ScanProgress::new();
        assert_eq!(progress.percentage(), 0);

        progress.total_items = 3;
        progress.scanned_items = 1;
        assert_eq!(progress.percentage(), 33);

        progress.scanned_items = 3;
        assert_eq!(progress.percentage(), 100);
    }

    #[test]
    fn test_scan_result_totals() {
        let mut root = Entry::new_directory("root", "root", 0);
        root.push_child(Entry::new_file("a.txt", "root/a.txt", 42));

        let result = ScanResult::new(
            root,
            ScanProgress::new(),
            Duration::from_millis(5),
            ScanOptions::default(),
            Vec::new(),
        );
        assert_eq!(result.total_size(), 42);
        assert!(!result.has_warnings());
    }
}
