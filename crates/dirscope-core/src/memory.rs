//! In-memory host implementing the filesystem access capability.
//!
//! `MemoryFs` backs embedding hosts that already hold a directory listing
//! and every test in the workspace. Faults can be injected per path to
//! exercise the per-entry failure paths of the scanner and the delete
//! orchestrator.

use std::collections::HashMap;
use std::future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use crate::error::{HostError, HostErrorKind};
use crate::handle::{
    BoxFuture, DirectoryPicker, FileInfo, Handle, HandleKind, HandleRef, PermissionMode,
    PermissionState,
};

type EnumerateHook = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Default)]
struct Faults {
    remove: Option<HostErrorKind>,
    enumerate: Option<HostErrorKind>,
    read: Option<HostErrorKind>,
    write_denied: bool,
}

#[derive(Debug)]
struct Node {
    kind: HandleKind,
    info: FileInfo,
    /// Child names in insertion order.
    children: Vec<String>,
    faults: Faults,
}

impl Node {
    fn directory() -> Self {
        Self {
            kind: HandleKind::Directory,
            info: FileInfo::default(),
            children: Vec::new(),
            faults: Faults::default(),
        }
    }

    fn file(info: FileInfo) -> Self {
        Self {
            kind: HandleKind::File,
            info,
            children: Vec::new(),
            faults: Faults::default(),
        }
    }
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<String, Node>,
    on_enumerate: Option<EnumerateHook>,
}

/// A shared, mutable in-memory directory tree.
///
/// Paths are slash-joined and start with the root name, e.g. `root/sub/a.txt`.
/// Cloning yields another reference to the same tree.
#[derive(Clone)]
pub struct MemoryFs {
    root: String,
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for MemoryFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFs")
            .field("root", &self.root)
            .field("nodes", &self.lock().nodes.len())
            .finish()
    }
}

impl MemoryFs {
    /// Create a tree holding only an empty root directory.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut inner = Inner::default();
        inner.nodes.insert(root.clone(), Node::directory());
        Self {
            root,
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle to the root directory.
    pub fn root(&self) -> HandleRef {
        self.make_handle(self.root.clone(), HandleKind::Directory)
    }

    /// Handle to any existing path.
    pub fn handle(&self, path: &str) -> Option<HandleRef> {
        let kind = self.lock().nodes.get(path)?.kind;
        Some(self.make_handle(path.to_string(), kind))
    }

    fn make_handle(&self, path: String, kind: HandleKind) -> HandleRef {
        let name = path.rsplit('/').next().unwrap_or(path.as_str()).to_string();
        Arc::new(MemoryHandle {
            fs: self.clone(),
            path,
            name,
            kind,
        })
    }

    /// Add a directory, creating missing ancestors.
    pub fn add_dir(&self, path: &str) -> &Self {
        let mut inner = self.lock();
        ensure_dir(&mut inner, path);
        drop(inner);
        self
    }

    /// Add a file with a size.
    pub fn add_file(&self, path: &str, size: u64) -> &Self {
        self.add_file_info(path, FileInfo::with_size(size))
    }

    /// Add a file with a size and modification time.
    pub fn add_file_modified(&self, path: &str, size: u64, modified: SystemTime) -> &Self {
        self.add_file_info(
            path,
            FileInfo {
                size,
                last_modified: Some(modified),
                mime_type: None,
            },
        )
    }

    /// Add a file with full metadata, creating missing ancestors.
    pub fn add_file_info(&self, path: &str, info: FileInfo) -> &Self {
        let mut inner = self.lock();
        if let Some((parent, name)) = path.rsplit_once('/') {
            ensure_dir(&mut inner, parent);
            link_child(&mut inner, parent, name);
        }
        inner.nodes.insert(path.to_string(), Node::file(info));
        drop(inner);
        self
    }

    /// Make `remove` on a path fail with the given kind.
    pub fn fail_remove(&self, path: &str, kind: HostErrorKind) -> &Self {
        self.with_faults(path, |f| f.remove = Some(kind))
    }

    /// Make enumerating a directory fail with the given kind.
    pub fn fail_enumerate(&self, path: &str, kind: HostErrorKind) -> &Self {
        self.with_faults(path, |f| f.enumerate = Some(kind))
    }

    /// Make reading a file's metadata fail with the given kind.
    pub fn fail_read(&self, path: &str, kind: HostErrorKind) -> &Self {
        self.with_faults(path, |f| f.read = Some(kind))
    }

    /// Report a path as not writable.
    pub fn deny_write(&self, path: &str) -> &Self {
        self.with_faults(path, |f| f.write_denied = true)
    }

    fn with_faults(&self, path: &str, apply: impl FnOnce(&mut Faults)) -> &Self {
        if let Some(node) = self.lock().nodes.get_mut(path) {
            apply(&mut node.faults);
        }
        self
    }

    /// Run a callback with the path of every directory being enumerated.
    pub fn on_enumerate(&self, hook: impl Fn(&str) + Send + Sync + 'static) -> &Self {
        self.lock().on_enumerate = Some(Arc::new(hook));
        self
    }

    /// Check if a path exists.
    pub fn exists(&self, path: &str) -> bool {
        self.lock().nodes.contains_key(path)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.lock().nodes.len()
    }

    /// Check if only the root is left.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    fn entries(&self, path: &str) -> Result<Vec<(String, HandleRef)>, HostError> {
        let (children, hook) = {
            let inner = self.lock();
            let node = inner
                .nodes
                .get(path)
                .ok_or_else(|| HostError::not_found(format!("{path} does not exist")))?;
            if node.kind != HandleKind::Directory {
                return Err(HostError::invalid_state(format!("{path} is not a directory")));
            }
            if let Some(kind) = node.faults.enumerate {
                return Err(HostError::new(kind, format!("cannot list {path}")));
            }
            let children: Vec<(String, String, HandleKind)> = node
                .children
                .iter()
                .filter_map(|name| {
                    let child = format!("{path}/{name}");
                    let kind = inner.nodes.get(&child)?.kind;
                    Some((name.clone(), child, kind))
                })
                .collect();
            (children, inner.on_enumerate.clone())
        };

        if let Some(hook) = hook {
            hook(path);
        }

        Ok(children
            .into_iter()
            .map(|(name, child, kind)| (name, self.make_handle(child, kind)))
            .collect())
    }

    fn file_info(&self, path: &str) -> Result<FileInfo, HostError> {
        let inner = self.lock();
        let node = inner
            .nodes
            .get(path)
            .ok_or_else(|| HostError::not_found(format!("{path} does not exist")))?;
        if node.kind != HandleKind::File {
            return Err(HostError::invalid_state(format!("{path} is not a file")));
        }
        if let Some(kind) = node.faults.read {
            return Err(HostError::new(kind, format!("cannot read {path}")));
        }
        Ok(node.info.clone())
    }

    fn permission(&self, path: &str, mode: PermissionMode) -> Result<PermissionState, HostError> {
        let inner = self.lock();
        let node = inner
            .nodes
            .get(path)
            .ok_or_else(|| HostError::not_found(format!("{path} does not exist")))?;
        let read_denied = node.faults.read == Some(HostErrorKind::NotAllowed)
            || node.faults.enumerate == Some(HostErrorKind::NotAllowed);
        let granted = match mode {
            PermissionMode::Read => !read_denied,
            PermissionMode::ReadWrite => !read_denied && !node.faults.write_denied,
        };
        Ok(if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        })
    }

    fn remove(&self, path: &str) -> Result<(), HostError> {
        let mut inner = self.lock();
        let node = inner
            .nodes
            .get(path)
            .ok_or_else(|| HostError::not_found(format!("{path} does not exist")))?;
        if let Some(kind) = node.faults.remove {
            return Err(HostError::new(kind, format!("cannot remove {path}")));
        }
        if !node.children.is_empty() {
            return Err(HostError::invalid_state(format!("{path} is not empty")));
        }

        inner.nodes.remove(path);
        if let Some((parent, name)) = path.rsplit_once('/') {
            if let Some(parent) = inner.nodes.get_mut(parent) {
                parent.children.retain(|c| c != name);
            }
        }
        Ok(())
    }
}

fn ensure_dir(inner: &mut Inner, path: &str) {
    if inner.nodes.contains_key(path) {
        return;
    }
    if let Some((parent, name)) = path.rsplit_once('/') {
        ensure_dir(inner, parent);
        link_child(inner, parent, name);
    }
    inner.nodes.insert(path.to_string(), Node::directory());
}

fn link_child(inner: &mut Inner, parent: &str, name: &str) {
    if let Some(node) = inner.nodes.get_mut(parent) {
        if !node.children.iter().any(|c| c == name) {
            node.children.push(name.to_string());
        }
    }
}

impl DirectoryPicker for MemoryFs {
    fn pick_directory(&self) -> BoxFuture<'_, Result<HandleRef, HostError>> {
        Box::pin(future::ready(Ok(self.root())))
    }
}

/// Handle into a [`MemoryFs`].
pub struct MemoryHandle {
    fs: MemoryFs,
    path: String,
    name: String,
    kind: HandleKind,
}

impl std::fmt::Debug for MemoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHandle")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish()
    }
}

impl MemoryHandle {
    /// Path of the object inside its tree.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Handle for MemoryHandle {
    fn kind(&self) -> HandleKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn entries(&self) -> BoxFuture<'_, Result<Vec<(String, HandleRef)>, HostError>> {
        Box::pin(future::ready(self.fs.entries(&self.path)))
    }

    fn get_file(&self) -> BoxFuture<'_, Result<FileInfo, HostError>> {
        Box::pin(future::ready(self.fs.file_info(&self.path)))
    }

    fn query_permission(
        &self,
        mode: PermissionMode,
    ) -> BoxFuture<'_, Result<PermissionState, HostError>> {
        Box::pin(future::ready(self.fs.permission(&self.path, mode)))
    }

    fn remove(&self) -> BoxFuture<'_, Result<(), HostError>> {
        Box::pin(future::ready(self.fs.remove(&self.path)))
    }
}
