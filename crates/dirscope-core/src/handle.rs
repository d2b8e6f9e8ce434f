//! Abstract filesystem access capability supplied by the host.
//!
//! The scanner and the delete orchestrator never touch the filesystem
//! directly. They talk to [`Handle`] objects handed out by the host, which
//! may be a browser-style directory grant, the local filesystem, or the
//! in-memory [`MemoryFs`](crate::MemoryFs).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Type alias for boxed futures returned by capability methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Shared reference to a host filesystem object.
pub type HandleRef = Arc<dyn Handle>;

/// Discriminates file handles from directory handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    File,
    Directory,
}

/// Access mode for a permission query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    Read,
    ReadWrite,
}

/// Answer to a permission query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// The host would have to ask the user.
    Prompt,
}

/// File metadata readable without touching content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInfo {
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, if the host reports one.
    pub last_modified: Option<SystemTime>,
    /// MIME type, if the host reports one.
    pub mime_type: Option<String>,
}

impl FileInfo {
    /// Create file info with only a size.
    pub fn with_size(size: u64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// A capability reference to one file or directory on the host.
///
/// Every method is asynchronous and may fail with a [`HostError`]. None of
/// them may block on user interaction; in particular `query_permission`
/// must never trigger a prompt.
pub trait Handle: Send + Sync + fmt::Debug {
    /// Whether this is a file or a directory.
    fn kind(&self) -> HandleKind;

    /// Final path segment of the object.
    fn name(&self) -> &str;

    /// Enumerate the immediate children of a directory.
    ///
    /// Children come back in host order, which is not guaranteed sorted.
    fn entries(&self) -> BoxFuture<'_, Result<Vec<(String, HandleRef)>, HostError>>;

    /// Read file metadata.
    fn get_file(&self) -> BoxFuture<'_, Result<FileInfo, HostError>>;

    /// Query the current permission state without prompting.
    fn query_permission(
        &self,
        mode: PermissionMode,
    ) -> BoxFuture<'_, Result<PermissionState, HostError>>;

    /// Remove the object. Directories must already be empty.
    fn remove(&self) -> BoxFuture<'_, Result<(), HostError>>;

    /// Check if this handle refers to a directory.
    fn is_directory(&self) -> bool {
        self.kind() == HandleKind::Directory
    }
}

/// User-driven grant of access to one directory.
pub trait DirectoryPicker: Send + Sync {
    /// Whether the host offers directory access at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Ask the user for a directory.
    ///
    /// A dismissed picker reports [`HostErrorKind::Aborted`](crate::HostErrorKind::Aborted).
    fn pick_directory(&self) -> BoxFuture<'_, Result<HandleRef, HostError>>;
}
