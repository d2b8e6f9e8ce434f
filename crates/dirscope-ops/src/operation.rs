//! Per-item delete failures.

use dirscope_core::{HostError, HostErrorKind};
use serde::{Deserialize, Serialize};

/// An error that occurred while deleting one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// Path of the entry that failed.
    pub path: String,
    /// Name of the entry that failed.
    pub name: String,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    /// Build the error for a failed removal, worded by failure kind.
    pub fn from_host(path: impl Into<String>, name: &str, error: &HostError) -> Self {
        Self::new(path, name, describe_failure(name, error))
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Turn a removal failure into a message naming the item.
pub fn describe_failure(name: &str, error: &HostError) -> String {
    match error.kind {
        HostErrorKind::NotAllowed => format!("Permission denied: Cannot delete {name}"),
        HostErrorKind::InvalidState => format!("Invalid state: {name} may be in use"),
        HostErrorKind::NotFound => {
            format!("Not found: {name} may have been moved or deleted")
        }
        _ => format!("Failed to delete {name}: {}", error.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        let cases = [
            (HostError::not_allowed("x"), "Permission denied: Cannot delete a.txt"),
            (HostError::invalid_state("x"), "Invalid state: a.txt may be in use"),
            (
                HostError::not_found("x"),
                "Not found: a.txt may have been moved or deleted",
            ),
            (HostError::other("disk on fire"), "Failed to delete a.txt: disk on fire"),
        ];
        for (error, expected) in cases {
            assert_eq!(describe_failure("a.txt", &error), expected);
        }
    }

    #[test]
    fn test_display() {
        let err = OperationError::from_host("root/a.txt", "a.txt", &HostError::not_found("gone"));
        assert_eq!(
            err.to_string(),
            "root/a.txt: Not found: a.txt may have been moved or deleted"
        );
    }
}
