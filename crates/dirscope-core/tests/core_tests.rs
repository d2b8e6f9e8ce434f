use dirscope_core::classify::{self, GIB, MIB};
use dirscope_core::{
    Entry, EntryKind, FileInfo, FileType, Handle, HandleKind, HostErrorKind, MemoryFs, Permissions,
    ScanOptions, ScanProgress, ScanResult, SizeBucket, child_path,
};
use std::time::{Duration, SystemTime};

#[test]
fn test_child_path_joins_with_slash() {
    assert_eq!(child_path("root", "a.txt"), "root/a.txt");
    assert_eq!(child_path("root/sub", "b"), "root/sub/b");
}

#[test]
fn test_entry_kind_discrimination() {
    let file = Entry::new_file("a.mp4", "root/a.mp4", 2 * GIB);
    assert!(file.is_file());
    assert!(!file.is_dir());
    assert_eq!(file.file_type(), Some(FileType::Video));
    assert_eq!(file.metadata.size_category, Some(SizeBucket::Huge));
    assert!(file.metadata.large);
    assert_eq!(file.icon(), "video");

    let dir = Entry::new_directory("sub", "root/sub", 1);
    assert!(dir.is_dir());
    assert_eq!(dir.depth(), Some(1));
    assert_eq!(dir.file_type(), None);
    assert_eq!(dir.icon(), "folder");
    assert!(matches!(dir.kind, EntryKind::Directory { child_count: 0, .. }));
}

#[test]
fn test_directory_size_equals_sum_of_children() {
    let mut inner = Entry::new_directory("inner", "root/outer/inner", 2);
    inner.push_child(Entry::new_file("x", "root/outer/inner/x", 7));
    inner.push_child(Entry::new_file("y", "root/outer/inner/y", 11));

    let mut outer = Entry::new_directory("outer", "root/outer", 1);
    outer.push_child(inner);
    outer.push_child(Entry::new_file("z", "root/outer/z", 5));

    let mut root = Entry::new_directory("root", "root", 0);
    root.push_child(outer);

    for dir in root.iter().filter(|e| e.is_dir()) {
        let sum: u64 = dir.children.iter().map(|c| c.size).sum();
        assert_eq!(dir.size, sum, "size mismatch at {}", dir.path);
    }
    assert_eq!(root.size, 23);
    assert_eq!(root.child_count(), 5);
}

#[test]
fn test_from_file_info_keeps_host_metadata() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.png", 10);
    let handle = fs.handle("root/a.png").unwrap();
    let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);

    let entry = Entry::from_file_info(
        "a.png",
        "root/a.png",
        FileInfo {
            size: 10,
            last_modified: Some(modified),
            mime_type: Some("image/png".to_string()),
        },
        handle,
    );

    assert!(entry.has_handle());
    assert_eq!(entry.last_modified, Some(modified));
    assert_eq!(entry.mime_type(), Some("image/png"));
}

#[test]
fn test_entry_serialization_skips_handle() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 3);
    let entry = Entry::new_file("a.txt", "root/a.txt", 3)
        .with_handle(fs.handle("root/a.txt").unwrap())
        .with_permissions(Permissions::new(true, false));

    let json = serde_json::to_string(&entry).unwrap();
    assert!(!json.contains("handle"));

    let back: Entry = serde_json::from_str(&json).unwrap();
    assert!(!back.has_handle());
    assert_eq!(back.permissions, Some(Permissions::new(true, false)));
    assert_eq!(back.size, 3);
}

#[test]
fn test_permissions_restricted() {
    assert!(Permissions::new(false, false).is_restricted());
    assert!(!Permissions::new(true, false).is_restricted());
    assert!(!Permissions::new(false, true).is_restricted());
}

#[test]
fn test_scan_result_round_trips_through_json() {
    let mut root = Entry::new_directory("root", "root", 0);
    root.push_child(Entry::new_file("a.txt", "root/a.txt", 100));

    let result = ScanResult::new(
        root,
        ScanProgress::new(),
        Duration::from_millis(12),
        ScanOptions::default(),
        Vec::new(),
    );
    let json = serde_json::to_string(&result).unwrap();
    let back: ScanResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.total_size(), 100);
    assert_eq!(back.root.children.len(), 1);
    assert_eq!(back.timestamp, result.timestamp);
}

#[test]
fn test_classify_helpers() {
    assert_eq!(classify::extension("archive.TAR.GZ").as_deref(), Some("gz"));
    assert_eq!(classify::extension("README"), None);
    assert!(classify::is_hidden(".env"));
    assert!(!classify::is_large_media_file("song.mp3", 50 * MIB));
}

#[tokio::test]
async fn test_memory_fs_handles() {
    let fs = MemoryFs::new("root");
    fs.add_dir("root/empty").add_file("root/a.txt", 4);

    let root = fs.root();
    assert_eq!(root.kind(), HandleKind::Directory);
    assert_eq!(root.name(), "root");

    let file = fs.handle("root/a.txt").unwrap();
    assert_eq!(file.name(), "a.txt");
    assert_eq!(file.get_file().await.unwrap().size, 4);

    fs.fail_remove("root/a.txt", HostErrorKind::InvalidState);
    assert_eq!(
        file.remove().await.unwrap_err().kind,
        HostErrorKind::InvalidState
    );
    assert!(fs.exists("root/a.txt"));
    assert!(fs.handle("root/missing").is_none());
}
