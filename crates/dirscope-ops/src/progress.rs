//! Progress reporting types for delete batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::OperationError;

/// Stage of a delete batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletePhase {
    /// Emitted once before the first item.
    Starting,
    /// Emitted after each successfully deleted item.
    Processing,
}

/// Progress information for an ongoing delete batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteProgress {
    pub phase: DeletePhase,
    /// Items deleted so far.
    pub processed: usize,
    /// Items in the batch after dropping entries without handles.
    pub total: usize,
    /// Name of the item just deleted.
    pub current_item: Option<String>,
    /// Human-readable status line.
    pub message: String,
}

impl DeleteProgress {
    pub(crate) fn starting(total: usize) -> Self {
        Self {
            phase: DeletePhase::Starting,
            processed: 0,
            total,
            current_item: None,
            message: format!("Preparing to delete {total} items..."),
        }
    }

    pub(crate) fn processed(processed: usize, total: usize, name: &str) -> Self {
        Self {
            phase: DeletePhase::Processing,
            processed,
            total,
            current_item: Some(name.to_string()),
            message: format!("Deleted: {name}"),
        }
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.processed as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Result of a completed delete batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSummary {
    /// Number of items deleted.
    pub success: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// One record per failed item.
    pub errors: Vec<OperationError>,
    /// Wall-clock time for the whole batch.
    pub duration: Duration,
}

impl DeleteSummary {
    /// Check if the batch was fully successful.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        if self.failed == 0 {
            format!("Deleted {} items", self.success)
        } else {
            format!("Deleted {} items, {} failed", self.success, self.failed)
        }
    }
}
