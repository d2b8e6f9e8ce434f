//! File and directory entry types.

use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::classify::{self, FileType, SizeBucket};
use crate::handle::{FileInfo, HandleRef};

/// Join a parent path and a child name.
pub fn child_path(parent: &str, name: &str) -> String {
    format!("{parent}/{name}")
}

/// Best-effort access flags checked at scan time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub readable: bool,
    pub writable: bool,
}

impl Permissions {
    /// Create a permission pair.
    pub fn new(readable: bool, writable: bool) -> Self {
        Self { readable, writable }
    }

    /// Neither readable nor writable.
    pub fn is_restricted(&self) -> bool {
        !self.readable && !self.writable
    }
}

/// Classification flags attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Name starts with a dot.
    pub hidden: bool,
    /// Matches the temp-file heuristic.
    pub temp: bool,
    /// Looks like an operating system directory.
    pub system: bool,
    /// Media file above 100 MiB.
    pub large: bool,
    /// Size bucket (files only).
    pub size_category: Option<SizeBucket>,
    /// Lowercased extension (files only).
    pub extension: Option<CompactString>,
}

impl EntryMetadata {
    /// Derive file flags from name, path and size.
    pub fn for_file(name: &str, path: &str, size: u64) -> Self {
        Self {
            hidden: classify::is_hidden(name),
            temp: classify::is_temp_file(name, path),
            system: false,
            large: classify::is_large_media_file(name, size),
            size_category: Some(SizeBucket::from_size(size)),
            extension: classify::extension(name).map(CompactString::from),
        }
    }

    /// Derive directory flags from name and path.
    pub fn for_directory(name: &str, path: &str) -> Self {
        Self {
            hidden: classify::is_hidden(name),
            system: classify::is_system_directory(name, path),
            ..Self::default()
        }
    }
}

/// Type of entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File {
        /// Classification tag.
        file_type: FileType,
        /// MIME type reported by the host.
        mime_type: Option<String>,
    },
    /// Directory.
    Directory {
        /// Number of descendants (files and folders) in this subtree.
        child_count: u64,
        /// Depth below the scan root (root is 0).
        depth: u32,
    },
}

impl EntryKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory { .. })
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File { .. })
    }
}

/// A single file or directory in a scanned tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Final path segment.
    pub name: CompactString,

    /// Slash-joined path from the scan root, unique within one scan.
    pub path: String,

    /// Entry type and type-specific data.
    pub kind: EntryKind,

    /// Size in bytes (sum of all descendant files for directories).
    pub size: u64,

    /// Last modification time (files only, when readable).
    pub last_modified: Option<SystemTime>,

    /// Host capability used for later deletion. `None` marks a placeholder.
    #[serde(skip)]
    pub handle: Option<HandleRef>,

    /// Permissions, if checked.
    pub permissions: Option<Permissions>,

    /// Classification flags.
    pub metadata: EntryMetadata,

    /// Set when the entry could not be read.
    pub error: Option<String>,

    /// Children (directories only), sorted by size descending after a scan.
    pub children: Vec<Entry>,
}

impl Entry {
    /// Create a file entry; classification flags are derived from name, path and size.
    pub fn new_file(name: impl Into<CompactString>, path: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let path = path.into();
        let metadata = EntryMetadata::for_file(&name, &path, size);
        Self {
            kind: EntryKind::File {
                file_type: FileType::from_name(&name),
                mime_type: None,
            },
            name,
            path,
            size,
            last_modified: None,
            handle: None,
            permissions: None,
            metadata,
            error: None,
            children: Vec::new(),
        }
    }

    /// Create a file entry from host metadata.
    pub fn from_file_info(
        name: impl Into<CompactString>,
        path: impl Into<String>,
        info: FileInfo,
        handle: HandleRef,
    ) -> Self {
        let mut entry = Self::new_file(name, path, info.size);
        entry.last_modified = info.last_modified;
        if let EntryKind::File { mime_type, .. } = &mut entry.kind {
            *mime_type = info.mime_type;
        }
        entry.handle = Some(handle);
        entry
    }

    /// Create an empty directory entry.
    pub fn new_directory(name: impl Into<CompactString>, path: impl Into<String>, depth: u32) -> Self {
        let name = name.into();
        let path = path.into();
        let metadata = EntryMetadata::for_directory(&name, &path);
        Self {
            name,
            path,
            kind: EntryKind::Directory {
                child_count: 0,
                depth,
            },
            size: 0,
            last_modified: None,
            handle: None,
            permissions: None,
            metadata,
            error: None,
            children: Vec::new(),
        }
    }

    /// Create a placeholder for a file that could not be read.
    pub fn placeholder(
        name: impl Into<CompactString>,
        path: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            kind: EntryKind::File {
                file_type: FileType::Unknown,
                mime_type: None,
            },
            name,
            path: path.into(),
            size: 0,
            last_modified: None,
            handle: None,
            permissions: None,
            metadata: EntryMetadata::default(),
            error: Some(error.into()),
            children: Vec::new(),
        }
    }

    /// Attach a host handle.
    pub fn with_handle(mut self, handle: HandleRef) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Set the modification time.
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.last_modified = Some(modified);
        self
    }

    /// Set checked permissions.
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this entry is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// File type tag (files only).
    pub fn file_type(&self) -> Option<FileType> {
        match &self.kind {
            EntryKind::File { file_type, .. } => Some(*file_type),
            EntryKind::Directory { .. } => None,
        }
    }

    /// MIME type reported by the host (files only).
    pub fn mime_type(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::File { mime_type, .. } => mime_type.as_deref(),
            EntryKind::Directory { .. } => None,
        }
    }

    /// Number of descendants for directories, 0 for files.
    pub fn child_count(&self) -> u64 {
        match &self.kind {
            EntryKind::Directory { child_count, .. } => *child_count,
            EntryKind::File { .. } => 0,
        }
    }

    /// Depth below the scan root for directories.
    pub fn depth(&self) -> Option<u32> {
        match &self.kind {
            EntryKind::Directory { depth, .. } => Some(*depth),
            EntryKind::File { .. } => None,
        }
    }

    /// Check if the entry can be handed to the delete orchestrator.
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// Icon tag for this entry.
    pub fn icon(&self) -> &'static str {
        classify::icon_for(&self.name, self.is_dir())
    }

    /// Check if this is a stand-in for a file that could not be read.
    pub fn is_placeholder(&self) -> bool {
        self.is_file() && self.handle.is_none() && self.error.is_some()
    }

    /// Append a child, keeping size and descendant count in step.
    ///
    /// Placeholders are kept as children but not counted as descendants.
    pub fn push_child(&mut self, child: Entry) {
        self.size += child.size;
        if let EntryKind::Directory { child_count, .. } = &mut self.kind {
            if !child.is_placeholder() {
                *child_count += 1 + child.child_count();
            }
        }
        self.children.push(child);
    }

    /// Sort direct children by size in descending order.
    pub fn sort_children_by_size(&mut self) {
        self.children.sort_by(|a, b| b.size.cmp(&a.size));
    }

    /// Depth-first pre-order iterator over this entry and all descendants.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Count files in this subtree.
    pub fn count_files(&self) -> usize {
        self.iter().filter(|e| e.is_file()).count()
    }

    /// Find a descendant (or self) by path.
    pub fn find(&self, path: &str) -> Option<&Entry> {
        if self.path == path {
            return Some(self);
        }
        let rest = path.strip_prefix(self.path.as_str())?.strip_prefix('/')?;
        let next = rest.split('/').next()?;
        self.children
            .iter()
            .find(|c| c.name.as_str() == next)
            .and_then(|c| c.find(path))
    }
}

/// Pre-order iterator returned by [`Entry::iter`].
pub struct Iter<'a> {
    stack: Vec<&'a Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.stack.pop()?;
        self.stack.extend(entry.children.iter().rev());
        Some(entry)
    }
}
