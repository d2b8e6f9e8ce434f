//! Batch-level delete errors.

use thiserror::Error;

/// Reasons a delete call is rejected before any item is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteError {
    /// The batch was empty.
    #[error("No items to delete")]
    NoItems,

    /// Every entry in the batch lacked a host handle.
    #[error("No valid items to delete (missing file handles)")]
    NoValidItems,

    /// The selection was empty or referred only to entries no longer in the tree.
    #[error("No items selected for deletion")]
    NothingSelected,
}
