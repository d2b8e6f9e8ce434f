//! Standalone folder size calculation.

use tracing::warn;

use dirscope_core::{BoxFuture, HandleRef};

/// Aggregate size of a directory subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSize {
    pub size: u64,
    pub file_count: u64,
    pub folder_count: u64,
}

/// Sum file sizes below `handle` without building a tree.
///
/// Unreadable files and directories are skipped. Hidden entries are
/// included; no filters apply.
pub fn calculate_folder_size(handle: &HandleRef) -> BoxFuture<'_, FolderSize> {
    Box::pin(async move {
        let mut total = FolderSize::default();
        let entries = match handle.entries().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(name = handle.name(), error = %err, "skipping unreadable directory");
                return total;
            }
        };

        for (_, child) in entries {
            if child.is_directory() {
                let sub = calculate_folder_size(&child).await;
                total.size += sub.size;
                total.file_count += sub.file_count;
                total.folder_count += sub.folder_count + 1;
            } else {
                match child.get_file().await {
                    Ok(info) => {
                        total.size += info.size;
                        total.file_count += 1;
                    }
                    Err(err) => {
                        warn!(name = child.name(), error = %err, "skipping unreadable file");
                    }
                }
            }
        }
        total
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirscope_core::{HostErrorKind, MemoryFs};

    #[tokio::test]
    async fn test_folder_size() {
        let fs = MemoryFs::new("root");
        fs.add_file("root/a", 10)
            .add_file("root/sub/b", 20)
            .add_file("root/sub/.c", 5)
            .add_file("root/sub/locked", 99)
            .fail_read("root/sub/locked", HostErrorKind::NotAllowed);

        let size = calculate_folder_size(&fs.root()).await;
        assert_eq!(size.size, 35);
        assert_eq!(size.file_count, 3);
        assert_eq!(size.folder_count, 1);
    }

    #[tokio::test]
    async fn test_unreadable_subdirectory_counts_as_empty() {
        let fs = MemoryFs::new("root");
        fs.add_file("root/a", 10)
            .add_file("root/private/secret", 500)
            .add_file("root/private/nested/deep", 7)
            .fail_enumerate("root/private", HostErrorKind::NotAllowed);

        let size = calculate_folder_size(&fs.root()).await;
        assert_eq!(size.size, 10);
        assert_eq!(size.file_count, 1);
        assert_eq!(size.folder_count, 1);
    }
}
