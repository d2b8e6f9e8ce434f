//! Sequential batch delete with partial-failure accounting.

use std::time::{Duration, Instant};

use chrono::Utc;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use dirscope_core::{BoxFuture, Entry, HandleRef, HostError};

use crate::error::DeleteError;
use crate::history::{
    DEFAULT_HISTORY_LIMIT, DeleteOperation, OperationHistory, OperationItem, OperationKind,
    OperationStats,
};
use crate::operation::OperationError;
use crate::progress::{DeleteProgress, DeleteSummary};
use crate::selection::SelectionSet;

/// Capacity of the progress broadcast channel.
const PROGRESS_CHANNEL_SIZE: usize = 100;

/// Configuration for the delete orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct DeleteOptions {
    /// Number of batches kept in the history.
    #[builder(default = "DEFAULT_HISTORY_LIMIT")]
    pub history_limit: usize,

    /// Pause between two items; zero still yields to the runtime.
    #[builder(default = "Duration::from_millis(10)")]
    pub item_delay: Duration,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            item_delay: Duration::from_millis(10),
        }
    }
}

impl DeleteOptions {
    /// Create a new options builder.
    pub fn builder() -> DeleteOptionsBuilder {
        DeleteOptionsBuilder::default()
    }
}

/// Deletes entries through their host handles and keeps the selection and
/// history in step.
///
/// Items are processed one at a time. A failure is recorded against its
/// item and the batch moves on. The scanned tree is not updated; re-scan to
/// see the result.
#[derive(Debug)]
pub struct DeleteOrchestrator {
    options: DeleteOptions,
    selection: SelectionSet,
    history: OperationHistory,
    progress_tx: broadcast::Sender<DeleteProgress>,
}

impl Default for DeleteOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl DeleteOrchestrator {
    /// Create an orchestrator with default options.
    pub fn new() -> Self {
        Self::with_options(DeleteOptions::default())
    }

    /// Create an orchestrator with the given options.
    pub fn with_options(options: DeleteOptions) -> Self {
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        Self {
            history: OperationHistory::new(options.history_limit),
            options,
            selection: SelectionSet::new(),
            progress_tx,
        }
    }

    /// Subscribe to delete progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<DeleteProgress> {
        self.progress_tx.subscribe()
    }

    /// Current selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Mutable access to the selection.
    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    /// Completed batches, newest first.
    pub fn history(&self) -> &OperationHistory {
        &self.history
    }

    /// Forget all recorded batches.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Totals over the recorded batches.
    pub fn stats(&self) -> OperationStats {
        self.history.stats()
    }

    /// Delete a single entry.
    pub async fn delete_entry(&mut self, entry: &Entry) -> Result<DeleteSummary, DeleteError> {
        self.delete_entries(&[entry]).await
    }

    /// Delete the selected entries of `root`.
    ///
    /// Selected paths no longer present in `root` are dropped from the
    /// selection first.
    pub async fn delete_selected(&mut self, root: &Entry) -> Result<DeleteSummary, DeleteError> {
        if self.selection.is_empty() {
            return Err(DeleteError::NothingSelected);
        }
        let stale = self.selection.prune(root);
        if stale > 0 {
            debug!(stale, "dropped selected paths missing from the tree");
        }
        let entries = self.selection.resolve(root);
        if entries.is_empty() {
            return Err(DeleteError::NothingSelected);
        }
        self.delete_entries(&entries).await
    }

    /// Delete a batch of entries.
    ///
    /// Entries without a handle are left out. Fails without emitting any
    /// progress when nothing remains. Otherwise always returns a summary,
    /// with one error record per failed item.
    pub async fn delete_entries(&mut self, entries: &[&Entry]) -> Result<DeleteSummary, DeleteError> {
        if entries.is_empty() {
            return Err(DeleteError::NoItems);
        }
        let valid: Vec<&Entry> = entries.iter().copied().filter(|e| e.has_handle()).collect();
        if valid.is_empty() {
            return Err(DeleteError::NoValidItems);
        }
        let skipped = entries.len() - valid.len();
        if skipped > 0 {
            debug!(skipped, "ignoring entries without handles");
        }

        let start = Instant::now();
        let started_at = Utc::now();
        let total = valid.len();
        let mut processed = 0;
        let mut errors = Vec::new();

        self.emit(DeleteProgress::starting(total));

        for (i, entry) in valid.iter().enumerate() {
            match remove_entry(entry).await {
                Ok(()) => {
                    processed += 1;
                    self.selection.deselect(&entry.path);
                    self.emit(DeleteProgress::processed(processed, total, &entry.name));
                }
                Err(err) => {
                    warn!(path = %entry.path, error = %err, "failed to delete");
                    errors.push(OperationError::from_host(
                        entry.path.as_str(),
                        &entry.name,
                        &err,
                    ));
                }
            }

            if i + 1 < total {
                self.pause().await;
            }
        }

        let summary = DeleteSummary {
            success: processed,
            failed: errors.len(),
            errors: errors.clone(),
            duration: start.elapsed(),
        };
        info!(
            success = summary.success,
            failed = summary.failed,
            elapsed_ms = summary.duration.as_millis() as u64,
            "delete batch complete"
        );

        self.history.record(DeleteOperation {
            kind: OperationKind::Delete,
            items: valid.iter().map(|e| OperationItem::from(*e)).collect(),
            total_items: total,
            processed_items: processed,
            errors,
            started_at,
        });

        Ok(summary)
    }

    fn emit(&self, progress: DeleteProgress) {
        // No subscribers is fine
        let _ = self.progress_tx.send(progress);
    }

    async fn pause(&self) {
        if self.options.item_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.options.item_delay).await;
        }
    }
}

/// Remove one entry; directories are emptied first.
async fn remove_entry(entry: &Entry) -> Result<(), HostError> {
    let Some(handle) = &entry.handle else {
        return Err(HostError::other(format!(
            "No handle available for {}",
            entry.name
        )));
    };
    if entry.is_dir() {
        remove_contents(handle).await;
    }
    handle.remove().await
}

/// Best-effort removal of everything below a directory handle.
///
/// Failures are logged and skipped so siblings still get a chance; the
/// final removal of the directory itself reports what is left.
fn remove_contents(dir: &HandleRef) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let children = match dir.entries().await {
            Ok(children) => children,
            Err(err) => {
                warn!(dir = dir.name(), error = %err, "cannot list directory contents");
                return;
            }
        };
        for (name, child) in children {
            if child.is_directory() {
                remove_contents(&child).await;
            }
            if let Err(err) = child.remove().await {
                warn!(name = %name, error = %err, "failed to delete nested entry");
            }
        }
    })
}
