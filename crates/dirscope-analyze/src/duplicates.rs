//! Duplicate file detection by size and name.
//!
//! Uses a two-phase grouping:
//! 1. Group files by exact byte size (cheap pre-filter)
//! 2. Within each size group, group by name (lowercased by default)
//!
//! Content is never read, so two different files that share a size and a
//! name are reported as duplicates and copies with different names are not.

use std::collections::{BTreeMap, HashMap};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dirscope_core::Entry;

use crate::stats::flatten;

/// Configuration for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct DuplicateConfig {
    /// Minimum file size to consider; the default skips empty files.
    #[builder(default = "1")]
    pub min_size: u64,

    /// Compare names case-sensitively.
    #[builder(default = "false")]
    pub case_sensitive_names: bool,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            min_size: 1,
            case_sensitive_names: false,
        }
    }
}

impl DuplicateConfig {
    /// Create a new config builder.
    pub fn builder() -> DuplicateConfigBuilder {
        DuplicateConfigBuilder::default()
    }
}

/// Files sharing a size and a name.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup<'a> {
    /// Size of each file in bytes.
    pub size: u64,

    /// Member files in tree order.
    pub entries: Vec<&'a Entry>,

    /// Wasted space: size * (count - 1).
    pub wasted_bytes: u64,
}

impl DuplicateGroup<'_> {
    /// Get the number of duplicate files.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Check if keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Paths of all members.
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }
}

/// Results from duplicate analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DuplicateReport<'a> {
    /// Groups keyed by `"{size}_{name}"`.
    pub groups: BTreeMap<String, DuplicateGroup<'a>>,

    /// Number of files analyzed.
    pub files_analyzed: u64,

    /// Total wasted space (could be reclaimed).
    pub total_wasted_space: u64,
}

impl<'a> DuplicateReport<'a> {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Get the number of duplicate groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Get total number of duplicate files across all groups.
    pub fn total_duplicate_files(&self) -> usize {
        self.groups.values().map(|g| g.count()).sum()
    }

    /// Group containing the entry at `path`, if any.
    pub fn group_of(&self, path: &str) -> Option<(&str, &DuplicateGroup<'a>)> {
        self.groups
            .iter()
            .find(|(_, g)| g.entries.iter().any(|e| e.path == path))
            .map(|(k, g)| (k.as_str(), g))
    }

    /// All member files, group by group.
    pub fn files(&self) -> impl Iterator<Item = &'a Entry> + '_ {
        self.groups.values().flat_map(|g| g.entries.iter().copied())
    }
}

/// Duplicate file finder.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    config: DuplicateConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new duplicate finder with custom config.
    pub fn with_config(config: DuplicateConfig) -> Self {
        Self { config }
    }

    /// Find duplicates in a scanned tree.
    pub fn find_duplicates<'a>(&self, root: &'a Entry) -> DuplicateReport<'a> {
        let files: Vec<&Entry> = flatten(root)
            .into_iter()
            .filter(|f| f.size >= self.config.min_size)
            .collect();
        let files_analyzed = files.len() as u64;

        // Phase 1: group by size
        let mut by_size: HashMap<u64, Vec<&Entry>> = HashMap::new();
        for file in files {
            by_size.entry(file.size).or_default().push(file);
        }

        // Phase 2: group by name within each size group
        let mut groups = BTreeMap::new();
        for (size, same_size) in by_size {
            if same_size.len() < 2 {
                continue;
            }
            let mut by_name: HashMap<String, Vec<&Entry>> = HashMap::new();
            for file in same_size {
                by_name.entry(self.name_key(&file.name)).or_default().push(file);
            }
            for (name, entries) in by_name {
                if entries.len() < 2 {
                    continue;
                }
                let wasted_bytes = size * (entries.len() as u64 - 1);
                groups.insert(
                    format!("{size}_{name}"),
                    DuplicateGroup {
                        size,
                        entries,
                        wasted_bytes,
                    },
                );
            }
        }

        let total_wasted_space = groups.values().map(|g| g.wasted_bytes).sum();
        debug!(
            files_analyzed,
            groups = groups.len(),
            total_wasted_space,
            "duplicate detection finished"
        );

        DuplicateReport {
            groups,
            files_analyzed,
            total_wasted_space,
        }
    }

    fn name_key(&self, name: &str) -> String {
        if self.config.case_sensitive_names {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }
}

/// Find duplicates with the default configuration.
pub fn find_duplicates(root: &Entry) -> DuplicateReport<'_> {
    DuplicateFinder::new().find_duplicates(root)
}
