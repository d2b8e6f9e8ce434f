//! Error types for scanning and host operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure category reported by the host capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum HostErrorKind {
    /// Access was refused.
    #[strum(to_string = "Permission denied")]
    NotAllowed,
    /// The object is busy or in a state that forbids the call.
    #[strum(to_string = "Invalid state")]
    InvalidState,
    /// The object does not exist (any more).
    #[strum(to_string = "Not found")]
    NotFound,
    /// The user dismissed a prompt or picker.
    #[strum(to_string = "Aborted")]
    Aborted,
    /// The host does not offer the capability.
    #[strum(to_string = "Unsupported")]
    Unsupported,
    /// Anything else.
    #[strum(to_string = "Error")]
    Other,
}

/// An error returned by a [`Handle`](crate::Handle) call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct HostError {
    /// Failure category.
    pub kind: HostErrorKind,
    /// Host-provided detail.
    pub message: String,
}

impl HostError {
    /// Create a new host error.
    pub fn new(kind: HostErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a permission denied error.
    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::NotAllowed, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::NotFound, message)
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::InvalidState, message)
    }

    /// Create an aborted error.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Aborted, message)
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Other, message)
    }

    /// Classify a local I/O error.
    pub fn from_io(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        let kind = match err.kind() {
            ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => {
                HostErrorKind::NotAllowed
            }
            ErrorKind::NotFound => HostErrorKind::NotFound,
            ErrorKind::DirectoryNotEmpty | ErrorKind::ResourceBusy | ErrorKind::IsADirectory => {
                HostErrorKind::InvalidState
            }
            ErrorKind::Unsupported => HostErrorKind::Unsupported,
            _ => HostErrorKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

/// Errors that terminate a whole scan.
///
/// Per-entry failures never surface here; they become placeholder entries
/// and [`ScanWarning`]s instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The host has no directory access capability.
    #[error("Directory access is not supported: {requirement}")]
    Unsupported { requirement: String },

    /// The user dismissed the picker or cancelled the scan.
    #[error("Scan cancelled by user")]
    Cancelled,

    /// The safety cap on item count was exceeded.
    #[error("Too many files (>{limit}). Please select a smaller directory.")]
    TooManyItems { limit: u64 },

    /// The scan root is a file.
    #[error("Root is not a directory: {path}")]
    NotADirectory { path: String },

    /// Unexpected host failure.
    #[error("Host error at {path}: {source}")]
    Host {
        path: String,
        #[source]
        source: HostError,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Wrap a host error with path context.
    ///
    /// Aborted and unsupported host failures map onto the dedicated
    /// cancellation and environment variants.
    pub fn host(path: impl Into<String>, source: HostError) -> Self {
        match source.kind {
            HostErrorKind::Aborted => Self::Cancelled,
            HostErrorKind::Unsupported => Self::Unsupported {
                requirement: source.message,
            },
            _ => Self::Host {
                path: path.into(),
                source,
            },
        }
    }

    /// Check if this is a user cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error enumerating a directory.
    ReadError,
    /// Error reading file metadata.
    MetadataError,
}

/// Non-fatal warning encountered during scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<String>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a directory that could not be enumerated.
    pub fn read_error(path: impl Into<String>, error: &HostError) -> Self {
        Self::new(path, format!("Read error: {error}"), Self::kind_for(error, WarningKind::ReadError))
    }

    /// Create a warning for a file whose metadata could not be read.
    pub fn metadata_error(path: impl Into<String>, error: &HostError) -> Self {
        Self::new(
            path,
            format!("Could not access file: {error}"),
            Self::kind_for(error, WarningKind::MetadataError),
        )
    }

    fn kind_for(error: &HostError, fallback: WarningKind) -> WarningKind {
        if error.kind == HostErrorKind::NotAllowed {
            WarningKind::PermissionDenied
        } else {
            fallback
        }
    }
}
