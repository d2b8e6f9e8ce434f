//! Directory scanning engine for dirscope.
//!
//! This crate walks a host directory handle and builds the [`Entry`] tree.
//!
//! # Overview
//!
//! - **Two phases**: a counting pass establishes the denominator for
//!   percentage progress, then the scanning pass builds the tree
//! - **Progress updates** via broadcast channels, throttled by time
//! - **Cooperative**: yields to the runtime every few entries and checks a
//!   [`CancellationToken`] at every directory and loop iteration
//! - **Fault tolerant**: unreadable files become placeholder entries and
//!   unreadable directories carry an `error`, the scan goes on
//!
//! # Example
//!
//! ```rust,no_run
//! use dirscope_scan::{LocalPicker, Scanner, ScanOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), dirscope_scan::ScanError> {
//! let scanner = Scanner::with_options(ScanOptions::default());
//! let picker = LocalPicker::new("/path/to/scan");
//! let result = scanner.select_and_scan(&picker, &CancellationToken::new()).await?;
//!
//! println!("Total size: {} bytes", result.total_size());
//! # Ok(())
//! # }
//! ```
//!
//! # Background scans
//!
//! [`start_scan`] runs a scan on a spawned task and delivers progress
//! followed by exactly one terminal message:
//!
//! ```rust,no_run
//! use dirscope_scan::{start_scan, ScanMessage, ScanOptions};
//! use dirscope_core::MemoryFs;
//!
//! # async fn run() {
//! let fs = MemoryFs::new("root");
//! let mut task = start_scan(fs.root(), ScanOptions::default());
//! while let Some(message) = task.recv().await {
//!     match message {
//!         ScanMessage::Progress(p) => println!("{}%", p.percentage),
//!         ScanMessage::Complete(result) => println!("{} bytes", result.total_size()),
//!         ScanMessage::Failed(err) => eprintln!("{err}"),
//!         ScanMessage::Cancelled => println!("cancelled"),
//!     }
//! }
//! # }
//! ```

mod folder;
mod local;
mod progress;
mod scanner;
mod task;

pub use folder::{FolderSize, calculate_folder_size};
pub use local::{LocalHandle, LocalPicker};
pub use progress::{ProgressEvent, ScanPhase};
pub use scanner::Scanner;
pub use task::{SCAN_CHANNEL_SIZE, ScanMessage, ScanTask, start_scan};

pub use tokio_util::sync::CancellationToken;

// Re-export core types for convenience
pub use dirscope_core::{
    Entry, EntryKind, HandleRef, ScanError, ScanOptions, ScanProgress, ScanResult, ScanWarning,
    WarningKind,
};
