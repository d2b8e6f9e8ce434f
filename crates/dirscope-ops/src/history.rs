//! Bounded log of completed delete batches.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dirscope_core::Entry;

use crate::OperationError;

/// Default number of batches kept in the history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Kind of recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Delete,
}

/// Snapshot of one entry submitted to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationItem {
    pub path: String,
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

impl From<&Entry> for OperationItem {
    fn from(entry: &Entry) -> Self {
        Self {
            path: entry.path.clone(),
            name: entry.name.to_string(),
            size: entry.size,
            is_dir: entry.is_dir(),
        }
    }
}

/// Record of one delete batch. Never modified after it is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOperation {
    pub kind: OperationKind,
    /// Items that entered processing.
    pub items: Vec<OperationItem>,
    pub total_items: usize,
    /// Items deleted successfully.
    pub processed_items: usize,
    pub errors: Vec<OperationError>,
    pub started_at: DateTime<Utc>,
}

impl DeleteOperation {
    /// Bytes of items that did not fail.
    pub fn bytes_deleted(&self) -> u64 {
        self.items
            .iter()
            .filter(|item| !self.errors.iter().any(|e| e.path == item.path))
            .map(|item| item.size)
            .sum()
    }
}

/// Aggregate figures over the history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStats {
    pub total_operations: usize,
    pub delete_operations: usize,
    pub total_items_deleted: usize,
    pub total_size_deleted: u64,
    pub errors: usize,
}

/// Most-recent-first history with a fixed capacity.
#[derive(Debug)]
pub struct OperationHistory {
    entries: VecDeque<DeleteOperation>,
    max_entries: usize,
}

impl Default for OperationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl OperationHistory {
    /// Create a history keeping at most `max_entries` records.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1000)),
            max_entries,
        }
    }

    /// Record a batch; the oldest record is dropped when full.
    pub fn record(&mut self, operation: DeleteOperation) {
        self.entries.push_front(operation);
        self.entries.truncate(self.max_entries);
    }

    /// Iterate from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &DeleteOperation> {
        self.entries.iter()
    }

    /// Most recent record.
    pub fn latest(&self) -> Option<&DeleteOperation> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget all records.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Totals over all records.
    pub fn stats(&self) -> OperationStats {
        let mut stats = OperationStats {
            total_operations: self.entries.len(),
            ..OperationStats::default()
        };
        for op in &self.entries {
            match op.kind {
                OperationKind::Delete => {
                    stats.delete_operations += 1;
                    stats.total_items_deleted += op.processed_items;
                    stats.errors += op.errors.len();
                    stats.total_size_deleted += op.bytes_deleted();
                }
            }
        }
        stats
    }
}
