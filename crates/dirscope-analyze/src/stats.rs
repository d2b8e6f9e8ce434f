//! Tree statistics and flattening.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dirscope_core::{Entry, FileType, SizeBucket};

/// All files in the tree, depth-first in tree order.
///
/// Directories are left out. After a scan each level is ordered by size
/// descending, so the result follows that order within each directory.
pub fn flatten(root: &Entry) -> Vec<&Entry> {
    root.iter().filter(|e| e.is_file()).collect()
}

/// Every entry below the root, files and directories, depth-first in tree order.
pub fn entries(root: &Entry) -> Vec<&Entry> {
    root.iter().skip(1).collect()
}

/// Name, path and size of a notable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub name: String,
    pub path: String,
    pub size: u64,
}

impl EntrySummary {
    fn of(entry: &Entry) -> Self {
        Self {
            name: entry.name.to_string(),
            path: entry.path.clone(),
            size: entry.size,
        }
    }
}

/// File counts per size bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeDistribution {
    pub tiny: u64,
    pub small: u64,
    pub medium: u64,
    pub large: u64,
    pub huge: u64,
}

impl SizeDistribution {
    /// Count one file of `size` bytes in its bucket.
    pub fn record(&mut self, size: u64) {
        match SizeBucket::from_size(size) {
            SizeBucket::Tiny => self.tiny += 1,
            SizeBucket::Small => self.small += 1,
            SizeBucket::Medium => self.medium += 1,
            SizeBucket::Large => self.large += 1,
            SizeBucket::Huge => self.huge += 1,
        }
    }

    /// Count for one bucket.
    pub fn get(&self, bucket: SizeBucket) -> u64 {
        match bucket {
            SizeBucket::Tiny => self.tiny,
            SizeBucket::Small => self.small,
            SizeBucket::Medium => self.medium,
            SizeBucket::Large => self.large,
            SizeBucket::Huge => self.huge,
        }
    }

    /// Sum over all buckets.
    pub fn total(&self) -> u64 {
        self.tiny + self.small + self.medium + self.large + self.huge
    }
}

/// Counts over entries whose permissions were checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCounts {
    pub readable: u64,
    pub writable: u64,
    /// Neither readable nor writable.
    pub restricted: u64,
}

/// Aggregate statistics over a scanned tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_files: u64,
    /// Directories, including the root.
    pub total_folders: u64,
    /// Bytes of all files.
    pub total_size: u64,
    pub largest_file: Option<EntrySummary>,
    /// Largest directory below the root.
    ///
    /// The root is left out since it always contains every other directory;
    /// `None` when the root has no subdirectories.
    pub largest_folder: Option<EntrySummary>,
    /// File count per type.
    pub file_types: BTreeMap<FileType, u64>,
    pub size_distribution: SizeDistribution,
    pub permissions: PermissionCounts,
}

impl Stats {
    /// Share of files of the given type, 0.0-1.0.
    pub fn type_share(&self, file_type: FileType) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        self.file_types.get(&file_type).copied().unwrap_or(0) as f64 / self.total_files as f64
    }
}

/// Compute statistics in a single traversal.
pub fn compute_stats(root: &Entry) -> Stats {
    let mut stats = Stats::default();
    let mut largest_file: Option<&Entry> = None;
    let mut largest_folder: Option<&Entry> = None;

    for entry in root.iter() {
        if entry.is_dir() {
            stats.total_folders += 1;
            let is_root = std::ptr::eq(entry, root);
            if !is_root && largest_folder.is_none_or(|f| entry.size > f.size) {
                largest_folder = Some(entry);
            }
        } else {
            stats.total_files += 1;
            stats.total_size += entry.size;
            if largest_file.is_none_or(|f| entry.size > f.size) {
                largest_file = Some(entry);
            }
            let file_type = entry.file_type().unwrap_or(FileType::Unknown);
            *stats.file_types.entry(file_type).or_insert(0) += 1;
            stats.size_distribution.record(entry.size);
        }

        if let Some(permissions) = entry.permissions {
            if permissions.readable {
                stats.permissions.readable += 1;
            }
            if permissions.writable {
                stats.permissions.writable += 1;
            }
            if permissions.is_restricted() {
                stats.permissions.restricted += 1;
            }
        }
    }

    stats.largest_file = largest_file.map(EntrySummary::of);
    stats.largest_folder = largest_folder.map(EntrySummary::of);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirscope_core::Permissions;
    use dirscope_core::classify::{GIB, MIB};

    fn sample_tree() -> Entry {
        let mut media = Entry::new_directory("media", "root/media", 1);
        media.push_child(Entry::new_file("movie.mkv", "root/media/movie.mkv", 2 * GIB));
        media.push_child(
            Entry::new_file("song.mp3", "root/media/song.mp3", 5 * MIB)
                .with_permissions(Permissions::new(true, false)),
        );

        let mut empty = Entry::new_directory("empty", "root/empty", 1);
        empty.permissions = Some(Permissions::new(false, false));

        let mut root = Entry::new_directory("root", "root", 0);
        root.push_child(media);
        root.push_child(empty);
        root.push_child(
            Entry::new_file("notes.txt", "root/notes.txt", 10)
                .with_permissions(Permissions::new(true, true)),
        );
        root.push_child(Entry::placeholder("locked", "root/locked", "Access denied"));
        root
    }

    #[test]
    fn test_flatten_files_only() {
        let root = sample_tree();
        let files = flatten(&root);
        let names: Vec<&str> = files.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["movie.mkv", "song.mp3", "notes.txt", "locked"]);
        assert_eq!(files.len(), root.count_files());
    }

    #[test]
    fn test_compute_stats() {
        let root = sample_tree();
        let stats = compute_stats(&root);

        assert_eq!(stats.total_files, 4);
        assert_eq!(stats.total_folders, 3);
        assert_eq!(stats.total_size, 2 * GIB + 5 * MIB + 10);
        assert_eq!(stats.largest_file.as_ref().map(|f| f.name.as_str()), Some("movie.mkv"));
        assert_eq!(stats.largest_folder.as_ref().map(|f| f.path.as_str()), Some("root/media"));

        assert_eq!(stats.file_types.get(&FileType::Video), Some(&1));
        assert_eq!(stats.file_types.get(&FileType::Audio), Some(&1));
        assert_eq!(stats.file_types.get(&FileType::Unknown), Some(&1));

        assert_eq!(stats.size_distribution.huge, 1);
        assert_eq!(stats.size_distribution.medium, 1);
        assert_eq!(stats.size_distribution.tiny, 2);
        assert_eq!(stats.size_distribution.total(), stats.total_files);

        assert_eq!(
            stats.permissions,
            PermissionCounts {
                readable: 2,
                writable: 1,
                restricted: 1,
            }
        );
    }

    #[test]
    fn test_stats_of_empty_root() {
        let root = Entry::new_directory("root", "root", 0);
        let stats = compute_stats(&root);
        assert_eq!(stats.total_folders, 1);
        assert_eq!(stats.total_files, 0);
        assert!(stats.largest_file.is_none());
        assert!(stats.largest_folder.is_none());
        assert_eq!(stats.type_share(FileType::Image), 0.0);
    }
}
