//! Error types for analysis and queries.

use thiserror::Error;

/// Errors from parsing or running a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Filter name is neither a bucket nor a file type.
    #[error("Unknown filter '{name}' (expected all, files, folders, large, huge, temp or a file type)")]
    UnknownFilter { name: String },

    /// Sort field is not one of the supported fields.
    #[error("Unknown sort field '{name}' (expected name, path, size, modified or type)")]
    UnknownSortField { name: String },

    /// Sort direction is neither `asc` nor `desc`.
    #[error("Unknown sort direction '{name}' (expected asc or desc)")]
    UnknownSortDirection { name: String },

    /// Page size or range bounds out of order.
    #[error("Invalid query: {message}")]
    Invalid { message: String },
}

/// Errors from exporting a selection.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The selection resolved to no entries.
    #[error("No items selected for export")]
    NothingSelected,

    /// JSON serialization failed.
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}
