//! Local filesystem host backed by `tokio::fs`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dirscope_core::{
    BoxFuture, DirectoryPicker, FileInfo, Handle, HandleKind, HandleRef, HostError,
    PermissionMode, PermissionState,
};

/// Handle to a file or directory on the local filesystem.
///
/// Symlinks are reported as files and never followed.
#[derive(Debug, Clone)]
pub struct LocalHandle {
    path: PathBuf,
    name: String,
    kind: HandleKind,
}

impl LocalHandle {
    /// Open a handle for an existing path.
    pub async fn open(path: impl Into<PathBuf>) -> Result<HandleRef, HostError> {
        let path = path.into();
        let metadata = tokio::fs::symlink_metadata(&path)
            .await
            .map_err(|e| HostError::from_io(&e))?;
        let kind = if metadata.is_dir() {
            HandleKind::Directory
        } else {
            HandleKind::File
        };
        let name = display_name(&path);
        Ok(Arc::new(Self { path, name, kind }))
    }

    /// Filesystem path behind this handle.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn io_err(err: std::io::Error) -> HostError {
    HostError::from_io(&err)
}

impl Handle for LocalHandle {
    fn kind(&self) -> HandleKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> BoxFuture<'_, Result<Vec<(String, HandleRef)>, HostError>> {
        Box::pin(async move {
            let mut dir = tokio::fs::read_dir(&self.path).await.map_err(io_err)?;
            let mut entries = Vec::new();
            while let Some(entry) = dir.next_entry().await.map_err(io_err)? {
                let file_type = entry.file_type().await.map_err(io_err)?;
                let kind = if file_type.is_dir() {
                    HandleKind::Directory
                } else {
                    HandleKind::File
                };
                let name = entry.file_name().to_string_lossy().into_owned();
                let handle: HandleRef = Arc::new(LocalHandle {
                    path: entry.path(),
                    name: name.clone(),
                    kind,
                });
                entries.push((name, handle));
            }
            Ok(entries)
        })
    }

    fn get_file(&self) -> BoxFuture<'_, Result<FileInfo, HostError>> {
        Box::pin(async move {
            let metadata = tokio::fs::symlink_metadata(&self.path)
                .await
                .map_err(io_err)?;
            Ok(FileInfo {
                size: metadata.len(),
                last_modified: metadata.modified().ok(),
                mime_type: None,
            })
        })
    }

    fn query_permission(
        &self,
        mode: PermissionMode,
    ) -> BoxFuture<'_, Result<PermissionState, HostError>> {
        Box::pin(async move {
            let metadata = tokio::fs::symlink_metadata(&self.path)
                .await
                .map_err(io_err)?;
            let state = match mode {
                PermissionMode::Read => PermissionState::Granted,
                PermissionMode::ReadWrite if metadata.permissions().readonly() => {
                    PermissionState::Denied
                }
                PermissionMode::ReadWrite => PermissionState::Granted,
            };
            Ok(state)
        })
    }

    fn remove(&self) -> BoxFuture<'_, Result<(), HostError>> {
        Box::pin(async move {
            match self.kind {
                HandleKind::File => tokio::fs::remove_file(&self.path).await,
                HandleKind::Directory => tokio::fs::remove_dir(&self.path).await,
            }
            .map_err(io_err)
        })
    }
}

/// Directory picker that always returns a preselected local path.
#[derive(Debug, Clone)]
pub struct LocalPicker {
    path: PathBuf,
}

impl LocalPicker {
    /// Create a picker for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DirectoryPicker for LocalPicker {
    fn pick_directory(&self) -> BoxFuture<'_, Result<HandleRef, HostError>> {
        Box::pin(LocalHandle::open(self.path.clone()))
    }
}
