//! Core types and traits for dirscope.
//!
//! This crate provides the fundamental data structures shared by the
//! scanner, the analyzers and the delete orchestrator:
//!
//! - [`Entry`] - one file or directory node in a scanned tree
//! - [`ScanResult`] / [`ScanProgress`] - the snapshot a completed scan produces
//! - [`Handle`] / [`DirectoryPicker`] - the host's filesystem access capability
//! - [`classify`] - pure name/size/path classification rules
//! - [`MemoryFs`] - an in-memory host implementing the capability

pub mod classify;
mod config;
mod error;
mod handle;
pub mod memory;
mod node;
mod tree;

pub use classify::{FileType, SizeBucket};
pub use config::{ScanOptions, ScanOptionsBuilder};
pub use error::{HostError, HostErrorKind, ScanError, ScanWarning, WarningKind};
pub use handle::{
    BoxFuture, DirectoryPicker, FileInfo, Handle, HandleKind, HandleRef, PermissionMode,
    PermissionState,
};
pub use memory::MemoryFs;
pub use node::{Entry, EntryKind, EntryMetadata, Iter, Permissions, child_path};
pub use tree::{ScanProgress, ScanResult};
