use std::fs;
use std::sync::Arc;

use dirscope_core::{BoxFuture, DirectoryPicker, HostError, HostErrorKind, MemoryFs};
use dirscope_scan::{
    CancellationToken, LocalPicker, ScanError, ScanMessage, ScanOptions, ScanPhase, Scanner,
    WarningKind, start_scan,
};
use tempfile::TempDir;

fn scan_options() -> ScanOptions {
    ScanOptions::builder().build().unwrap()
}

#[tokio::test]
async fn test_sizes_roll_up() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 100).add_file("root/sub/b.txt", 200);

    let result = Scanner::new()
        .scan(fs.root(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.root.size, 300);
    let sub = result.root.find("root/sub").unwrap();
    assert_eq!(sub.size, 200);
    assert_eq!(sub.depth(), Some(1));
    assert_eq!(result.root.count_files(), 2);
    assert_eq!(result.root.child_count(), 3);
    assert!(result.root.iter().all(|e| e.has_handle()));
}

#[tokio::test]
async fn test_depth_limit_omits_deeper_subtrees() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 1)
        .add_file("root/sub/b.txt", 2)
        .add_file("root/sub/deep/c.txt", 4);

    let options = ScanOptions::builder().max_depth(1u32).build().unwrap();
    let result = Scanner::with_options(options)
        .scan(fs.root(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.root.find("root/sub/b.txt").is_some());
    assert!(result.root.find("root/sub/deep").is_none());
    assert_eq!(result.total_size(), 3);
}

#[tokio::test]
async fn test_temp_files_skipped_when_requested() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/keep.txt", 10)
        .add_file("root/old.bak", 20)
        .add_file("root/.profile", 30);

    let options = ScanOptions::builder()
        .skip_temp_files(true)
        .build()
        .unwrap();
    let result = Scanner::with_options(options)
        .scan(fs.root(), &CancellationToken::new())
        .await
        .unwrap();

    let names: Vec<&str> = result.root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["keep.txt"]);
    assert_eq!(result.progress.total_items, 1);
}

#[tokio::test]
async fn test_unreadable_file_becomes_placeholder() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/ok.txt", 10)
        .add_file("root/locked.bin", 500)
        .fail_read("root/locked.bin", HostErrorKind::NotAllowed);

    let result = Scanner::new()
        .scan(fs.root(), &CancellationToken::new())
        .await
        .unwrap();

    let locked = result.root.find("root/locked.bin").unwrap();
    assert_eq!(locked.size, 0);
    assert!(!locked.has_handle());
    assert!(locked.error.is_some());
    assert_eq!(result.total_size(), 10);
    assert_eq!(result.root.children.len(), 2);
    assert_eq!(result.root.child_count(), 1);

    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::PermissionDenied);
    assert_eq!(result.warnings[0].path, "root/locked.bin");
}

#[tokio::test]
async fn test_unreadable_directory_keeps_error() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 10)
        .add_file("root/private/secret.txt", 99)
        .fail_enumerate("root/private", HostErrorKind::Other);

    let result = Scanner::new()
        .scan(fs.root(), &CancellationToken::new())
        .await
        .unwrap();

    let private = result.root.find("root/private").unwrap();
    assert!(private.error.is_some());
    assert!(private.children.is_empty());
    assert_eq!(private.size, 0);
    assert_eq!(result.warnings[0].kind, WarningKind::ReadError);
    assert_eq!(result.total_size(), 10);
}

#[tokio::test]
async fn test_too_many_items() {
    let fs = MemoryFs::new("root");
    for i in 0..5 {
        fs.add_file(&format!("root/f{i}.txt"), 1);
    }

    let options = ScanOptions::builder().max_files(3u64).build().unwrap();
    let err = Scanner::with_options(options)
        .scan(fs.root(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::TooManyItems { limit: 3 }));
    assert_eq!(
        err.to_string(),
        "Too many files (>3). Please select a smaller directory."
    );
}

#[tokio::test]
async fn test_cancellation_during_scan() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a/x.txt", 1).add_file("root/b/y.txt", 2);

    // Cancel once the scanning pass reaches the second directory; the
    // counting pass enumerates it once before that.
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = seen.clone();
    fs.on_enumerate(move |path| {
        if path == "root/b"
            && counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 1
        {
            token.cancel();
        }
    });

    let err = Scanner::new().scan(fs.root(), &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 1);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = Scanner::new().scan(fs.root(), &cancel).await.unwrap_err();
    assert!(matches!(err, ScanError::Cancelled));
}

#[tokio::test]
async fn test_progress_events() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 1).add_file("root/b.txt", 2);

    let options = ScanOptions::builder()
        .progress_interval(std::time::Duration::ZERO)
        .build()
        .unwrap();
    let scanner = Scanner::with_options(options);
    let mut rx = scanner.subscribe();
    scanner.scan(fs.root(), &CancellationToken::new()).await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert_eq!(events.first().map(|e| e.phase), Some(ScanPhase::Counting));
    let last = events.last().unwrap();
    assert_eq!(last.phase, ScanPhase::Scanning);
    assert_eq!(last.percentage, 100);
    assert_eq!(last.total, 2);
    assert!(events.iter().any(|e| e.current_item.as_deref() == Some("root/b.txt")));
}

#[tokio::test]
async fn test_start_scan_delivers_terminal_message() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 7);

    let mut task = start_scan(fs.root(), scan_options());
    let mut last = None;
    while let Some(message) = task.recv().await {
        last = Some(message);
    }

    match last {
        Some(ScanMessage::Complete(result)) => assert_eq!(result.total_size(), 7),
        other => panic!("unexpected final message: {other:?}"),
    }
}

#[tokio::test]
async fn test_start_scan_reports_cancellation() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 7);

    let task_fs = fs.clone();
    let mut task = start_scan(task_fs.root(), scan_options());
    task.cancel();

    let mut terminal = Vec::new();
    while let Some(message) = task.recv().await {
        if message.is_terminal() {
            terminal.push(message);
        }
    }
    assert_eq!(terminal.len(), 1);
    assert!(matches!(terminal[0], ScanMessage::Cancelled));
}

struct NoPicker;

impl DirectoryPicker for NoPicker {
    fn is_supported(&self) -> bool {
        false
    }

    fn pick_directory(&self) -> BoxFuture<'_, Result<dirscope_core::HandleRef, HostError>> {
        Box::pin(async { Err(HostError::new(HostErrorKind::Unsupported, "no picker")) })
    }
}

struct DismissedPicker;

impl DirectoryPicker for DismissedPicker {
    fn pick_directory(&self) -> BoxFuture<'_, Result<dirscope_core::HandleRef, HostError>> {
        Box::pin(async { Err(HostError::aborted("user closed the dialog")) })
    }
}

#[tokio::test]
async fn test_select_and_scan_picker_failures() {
    let scanner = Scanner::new();
    let cancel = CancellationToken::new();

    let err = scanner.select_and_scan(&NoPicker, &cancel).await.unwrap_err();
    assert!(matches!(err, ScanError::Unsupported { .. }));

    let err = scanner
        .select_and_scan(&DismissedPicker, &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_select_and_scan_memory_host() {
    let fs = MemoryFs::new("root");
    fs.add_file("root/a.txt", 5);

    let result = Scanner::new()
        .select_and_scan(&fs, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.total_size(), 5);
}

#[tokio::test]
async fn test_local_scan() {
    let temp = TempDir::new().unwrap();
    // Tempdir names look like temp files, so scan a neutral subdirectory
    let root = temp.path().join("project");
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("README.md"), "hello").unwrap();
    fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();

    let result = Scanner::new()
        .select_and_scan(&LocalPicker::new(&root), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.root.name, "project");
    assert_eq!(result.total_size(), 17);
    let main = result.root.find("project/src/main.rs").unwrap();
    assert_eq!(main.size, 12);
    assert_eq!(main.file_type(), Some(dirscope_core::FileType::Code));
    assert!(main.last_modified.is_some());
}
