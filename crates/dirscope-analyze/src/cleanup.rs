//! Cleanup candidate classification.
//!
//! Flags files that are likely safe or worthwhile to remove:
//! - Temporary files (name or path heuristic)
//! - Large files
//! - Old files that are also big
//! - Duplicates (size + name heuristic)
//! - Empty folders

use std::time::{Duration, SystemTime};

use derive_builder::Builder;
use serde::Serialize;

use dirscope_core::Entry;
use dirscope_core::classify::{GIB, MIB};

use crate::duplicates::{DuplicateConfig, DuplicateFinder, DuplicateReport};
use crate::stats::flatten;

const YEAR: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Thresholds for cleanup suggestions.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct CleanupConfig {
    /// Files strictly above this size are large.
    #[builder(default = "GIB")]
    pub large_threshold: u64,

    /// Old files must also be strictly above this size.
    #[builder(default = "100 * MIB")]
    pub old_size_threshold: u64,

    /// Files last modified longer ago than this are old.
    #[builder(default = "YEAR")]
    pub old_age: Duration,

    /// Reference time for age calculations (default: now).
    #[builder(default = "SystemTime::now()")]
    pub reference_time: SystemTime,

    /// Duplicate detection settings.
    #[builder(default)]
    pub duplicates: DuplicateConfig,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            large_threshold: GIB,
            old_size_threshold: 100 * MIB,
            old_age: YEAR,
            reference_time: SystemTime::now(),
            duplicates: DuplicateConfig::default(),
        }
    }
}

impl CleanupConfig {
    /// Create a new config builder.
    pub fn builder() -> CleanupConfigBuilder {
        CleanupConfigBuilder::default()
    }

    fn is_old(&self, entry: &Entry) -> bool {
        let Some(modified) = entry.last_modified else {
            return false;
        };
        let age = self
            .reference_time
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        age > self.old_age && entry.size > self.old_size_threshold
    }
}

/// Cleanup candidates found in a tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupSuggestions<'a> {
    /// Files flagged by the temp heuristic, largest first.
    pub temp_files: Vec<&'a Entry>,
    /// Files above the large threshold, largest first.
    pub large_files: Vec<&'a Entry>,
    /// Files both old and above the old-size threshold, largest first.
    pub old_files: Vec<&'a Entry>,
    /// Duplicate groups.
    pub duplicates: DuplicateReport<'a>,
    /// Directories below the root with no children and no read error.
    pub empty_folders: Vec<&'a Entry>,
}

impl CleanupSuggestions<'_> {
    /// Bytes held by temp, large and old candidates (each file counted once).
    pub fn potential_savings(&self) -> u64 {
        let mut seen = std::collections::HashSet::new();
        self.temp_files
            .iter()
            .chain(&self.large_files)
            .chain(&self.old_files)
            .filter(|e| seen.insert(e.path.clone()))
            .map(|e| e.size)
            .sum()
    }

    /// Check if nothing was flagged.
    pub fn is_empty(&self) -> bool {
        self.temp_files.is_empty()
            && self.large_files.is_empty()
            && self.old_files.is_empty()
            && !self.duplicates.has_duplicates()
            && self.empty_folders.is_empty()
    }
}

/// Classify the files of `root` into cleanup candidates.
pub fn cleanup_suggestions<'a>(root: &'a Entry, config: &CleanupConfig) -> CleanupSuggestions<'a> {
    let files = flatten(root);

    let mut temp_files: Vec<&Entry> = files.iter().copied().filter(|f| f.metadata.temp).collect();
    let mut large_files: Vec<&Entry> = files
        .iter()
        .copied()
        .filter(|f| f.size > config.large_threshold)
        .collect();
    let mut old_files: Vec<&Entry> = files.iter().copied().filter(|f| config.is_old(f)).collect();

    for list in [&mut temp_files, &mut large_files, &mut old_files] {
        list.sort_by(|a, b| b.size.cmp(&a.size));
    }

    let empty_folders = root
        .iter()
        .filter(|e| {
            e.is_dir() && !std::ptr::eq(*e, root) && e.children.is_empty() && e.error.is_none()
        })
        .collect();

    CleanupSuggestions {
        temp_files,
        large_files,
        old_files,
        duplicates: DuplicateFinder::with_config(config.duplicates.clone()).find_duplicates(root),
        empty_folders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_old_requires_age_and_size() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10 * 365 * 24 * 60 * 60);
        let long_ago = now - 2 * YEAR;
        let config = CleanupConfig::builder().reference_time(now).build().unwrap();

        let big_old = Entry::new_file("a.iso", "root/a.iso", 200 * MIB).with_modified(long_ago);
        let small_old = Entry::new_file("b.txt", "root/b.txt", 10).with_modified(long_ago);
        let big_new = Entry::new_file("c.iso", "root/c.iso", 200 * MIB).with_modified(now);
        let unknown = Entry::new_file("d.iso", "root/d.iso", 200 * MIB);

        assert!(config.is_old(&big_old));
        assert!(!config.is_old(&small_old));
        assert!(!config.is_old(&big_new));
        assert!(!config.is_old(&unknown));
    }

    #[test]
    fn test_empty_folders_exclude_root_and_errored() {
        let mut errored = Entry::new_directory("locked", "root/locked", 1);
        errored.error = Some("Permission denied".to_string());

        let mut root = Entry::new_directory("root", "root", 0);
        root.push_child(Entry::new_directory("empty", "root/empty", 1));
        root.push_child(errored);

        let suggestions = cleanup_suggestions(&root, &CleanupConfig::default());
        let paths: Vec<&str> = suggestions.empty_folders.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["root/empty"]);

        let empty_root = Entry::new_directory("root", "root", 0);
        assert!(cleanup_suggestions(&empty_root, &CleanupConfig::default()).is_empty());
    }

    #[test]
    fn test_lists_sorted_by_size() {
        let mut root = Entry::new_directory("root", "root", 0);
        root.push_child(Entry::new_file("a.tmp", "root/a.tmp", 5));
        root.push_child(Entry::new_file("b.tmp", "root/b.tmp", 50));
        root.push_child(Entry::new_file("c.log", "root/c.log", 20));

        let suggestions = cleanup_suggestions(&root, &CleanupConfig::default());
        let sizes: Vec<u64> = suggestions.temp_files.iter().map(|e| e.size).collect();
        assert_eq!(sizes, vec![50, 20, 5]);
        assert_eq!(suggestions.potential_savings(), 75);
    }
}
