//! Two-phase cooperative directory scanner.

use std::time::Instant;

use compact_str::CompactString;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dirscope_core::{
    BoxFuture, DirectoryPicker, Entry, HandleRef, PermissionMode, PermissionState, Permissions,
    ScanError, ScanOptions, ScanResult, ScanWarning, child_path,
};

use crate::progress::{ProgressEvent, ProgressTracker, ScanPhase};

/// Capacity of the progress broadcast channel.
const PROGRESS_CHANNEL_SIZE: usize = 100;

/// Directory scanner working over host handles.
///
/// A scan runs in two passes. The counting pass walks the tree once to learn
/// how many entries exist, so the scanning pass can report a percentage. The
/// scanning pass reads file metadata and assembles the [`Entry`] tree.
pub struct Scanner {
    options: ScanOptions,
    progress_tx: broadcast::Sender<ProgressEvent>,
}

impl Scanner {
    /// Create a new scanner with default options.
    pub fn new() -> Self {
        Self::with_options(ScanOptions::default())
    }

    /// Create a new scanner with the given options.
    pub fn with_options(options: ScanOptions) -> Self {
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        Self {
            options,
            progress_tx,
        }
    }

    /// Options this scanner runs with.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress_tx.subscribe()
    }

    /// Ask the host for a directory and scan it.
    ///
    /// Fails with [`ScanError::Unsupported`] when the host has no directory
    /// picker and with [`ScanError::Cancelled`] when the user dismisses it.
    pub async fn select_and_scan(
        &self,
        picker: &dyn DirectoryPicker,
        cancel: &CancellationToken,
    ) -> Result<ScanResult, ScanError> {
        if !picker.is_supported() {
            return Err(ScanError::Unsupported {
                requirement: "a host with directory picking support".to_string(),
            });
        }
        let root = picker
            .pick_directory()
            .await
            .map_err(|e| ScanError::host("<picker>", e))?;
        self.scan(root, cancel).await
    }

    /// Scan the directory behind `root`.
    ///
    /// Unreadable entries do not abort the scan; they are recorded in the
    /// tree and in [`ScanResult::warnings`]. The scan aborts with
    /// [`ScanError::Cancelled`] once `cancel` fires and with
    /// [`ScanError::TooManyItems`] when the counting pass exceeds the cap.
    pub async fn scan(
        &self,
        root: HandleRef,
        cancel: &CancellationToken,
    ) -> Result<ScanResult, ScanError> {
        if self.options.max_files == 0 || self.options.yield_every == 0 {
            return Err(ScanError::InvalidConfig {
                message: "max_files and yield_every must be greater than zero".to_string(),
            });
        }

        let root_name = root.name().to_string();
        if !root.is_directory() {
            return Err(ScanError::NotADirectory { path: root_name });
        }

        let start = Instant::now();
        let mut walk = Walk {
            options: &self.options,
            cancel,
            progress_tx: &self.progress_tx,
            tracker: ProgressTracker::new(self.options.progress_interval),
            warnings: Vec::new(),
            visited: 0,
        };

        info!(root = %root_name, "counting entries");
        walk.emit(ScanPhase::Counting, None);
        walk.count_items(root.clone(), root_name.clone(), 0).await?;

        debug!(total = walk.tracker.counted(), "counting finished");
        walk.emit(ScanPhase::Scanning, None);
        let tree = walk
            .scan_directory(root, root_name.clone(), CompactString::from(root_name.as_str()), 0)
            .await?
            .unwrap_or_else(|| Entry::new_directory(root_name.as_str(), root_name.as_str(), 0));

        walk.check_cancelled()?;
        walk.emit(ScanPhase::Scanning, None);

        let scan_time = start.elapsed();
        info!(
            root = %tree.path,
            size = tree.size,
            items = walk.tracker.counted(),
            warnings = walk.warnings.len(),
            elapsed_ms = scan_time.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanResult::new(
            tree,
            walk.tracker.snapshot(),
            scan_time,
            self.options.clone(),
            walk.warnings,
        ))
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable state of one scan.
struct Walk<'a> {
    options: &'a ScanOptions,
    cancel: &'a CancellationToken,
    progress_tx: &'a broadcast::Sender<ProgressEvent>,
    tracker: ProgressTracker,
    warnings: Vec<ScanWarning>,
    visited: u64,
}

impl Walk<'_> {
    fn check_cancelled(&self) -> Result<(), ScanError> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        Ok(())
    }

    /// Send an update regardless of throttling.
    fn emit(&self, phase: ScanPhase, current_item: Option<&str>) {
        // No subscribers is fine
        let _ = self.progress_tx.send(self.tracker.event(phase, current_item));
    }

    fn report(&mut self, current_item: &str) {
        if self.tracker.should_emit() {
            self.emit(ScanPhase::Scanning, Some(current_item));
        }
    }

    async fn maybe_yield(&mut self) {
        self.visited += 1;
        if self.visited % self.options.yield_every == 0 {
            tokio::task::yield_now().await;
        }
    }

    /// First pass: count entries within the depth limit.
    fn count_items<'s>(
        &'s mut self,
        handle: HandleRef,
        path: String,
        depth: u32,
    ) -> BoxFuture<'s, Result<(), ScanError>> {
        Box::pin(async move {
            self.check_cancelled()?;
            if depth > self.options.max_depth {
                return Ok(());
            }

            let entries = match handle.entries().await {
                Ok(entries) => entries,
                Err(err) => {
                    debug!(path = %path, error = %err, "skipping unreadable directory while counting");
                    return Ok(());
                }
            };

            for (name, child) in entries {
                self.check_cancelled()?;
                let child_path = child_path(&path, &name);
                if self.options.should_skip(&name, &child_path) {
                    continue;
                }

                let is_dir = child.is_directory();
                self.tracker.record_counted(is_dir);
                if self.tracker.counted() > self.options.max_files {
                    warn!(limit = self.options.max_files, "item cap exceeded");
                    return Err(ScanError::TooManyItems {
                        limit: self.options.max_files,
                    });
                }

                if is_dir {
                    self.count_items(child, child_path, depth + 1).await?;
                }
                self.maybe_yield().await;
            }
            Ok(())
        })
    }

    /// Second pass: build the entry for one directory.
    ///
    /// Returns `None` when the directory lies beyond the depth limit.
    fn scan_directory<'s>(
        &'s mut self,
        handle: HandleRef,
        path: String,
        name: CompactString,
        depth: u32,
    ) -> BoxFuture<'s, Result<Option<Entry>, ScanError>> {
        Box::pin(async move {
            self.check_cancelled()?;
            if depth > self.options.max_depth {
                return Ok(None);
            }

            let mut dir = Entry::new_directory(name, path.as_str(), depth);

            let entries = match handle.entries().await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path, error = %err, "cannot read directory");
                    self.warnings.push(ScanWarning::read_error(path.as_str(), &err));
                    dir.permissions = self.check_permissions(&handle, false).await;
                    dir.error = Some(err.to_string());
                    dir.handle = Some(handle);
                    return Ok(Some(dir));
                }
            };
            dir.permissions = self.check_permissions(&handle, true).await;

            for (child_name, child) in entries {
                self.check_cancelled()?;
                let child_path = child_path(&path, &child_name);
                if self.options.should_skip(&child_name, &child_path) {
                    continue;
                }

                self.tracker.record_scanned();
                self.report(&child_path);

                if child.is_directory() {
                    let sub = self
                        .scan_directory(child, child_path, CompactString::from(child_name), depth + 1)
                        .await?;
                    if let Some(sub) = sub {
                        dir.push_child(sub);
                    }
                } else {
                    let entry = self.scan_file(child, child_name, child_path).await;
                    dir.push_child(entry);
                }

                self.maybe_yield().await;
            }

            dir.sort_children_by_size();
            dir.handle = Some(handle);
            Ok(Some(dir))
        })
    }

    async fn scan_file(&mut self, handle: HandleRef, name: String, path: String) -> Entry {
        match handle.get_file().await {
            Ok(info) => {
                self.tracker.record_bytes(info.size);
                let permissions = self.check_permissions(&handle, true).await;
                let mut entry = Entry::from_file_info(name, path, info, handle);
                entry.permissions = permissions;
                entry
            }
            Err(err) => {
                warn!(path = %path, error = %err, "cannot read file metadata");
                self.warnings
                    .push(ScanWarning::metadata_error(path.as_str(), &err));
                Entry::placeholder(name, path, err.to_string())
            }
        }
    }

    /// Readability comes from whether the read just succeeded; writability
    /// is asked of the host.
    async fn check_permissions(&self, handle: &HandleRef, readable: bool) -> Option<Permissions> {
        if !self.options.check_permissions {
            return None;
        }
        let writable = matches!(
            handle.query_permission(PermissionMode::ReadWrite).await,
            Ok(PermissionState::Granted)
        );
        Some(Permissions::new(readable, writable))
    }
}
