//! Delete orchestration for dirscope.
//!
//! This crate removes scanned entries through their host handles:
//!
//! - [`DeleteOrchestrator`] - sequential batch delete with progress events
//! - [`SelectionSet`] - the set of entries marked for deletion or export
//! - [`OperationHistory`] - a bounded log of completed batches
//! - [`validate_entries`] - risk warnings shown before confirming a batch
//!
//! # Example
//!
//! ```no_run
//! use dirscope_ops::DeleteOrchestrator;
//! # async fn run(result: dirscope_core::ScanResult) {
//! let mut orchestrator = DeleteOrchestrator::new();
//! let mut progress = orchestrator.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(update) = progress.recv().await {
//!         println!("{}", update.message);
//!     }
//! });
//!
//! let targets: Vec<_> = result.root.children.iter().take(2).collect();
//! match orchestrator.delete_entries(&targets).await {
//!     Ok(summary) => println!("{}", summary.summary()),
//!     Err(err) => eprintln!("{err}"),
//! }
//! # }
//! ```

mod delete;
mod error;
mod history;
mod operation;
mod progress;
mod selection;
mod validate;

pub use delete::{DeleteOptions, DeleteOptionsBuilder, DeleteOrchestrator};
pub use error::DeleteError;
pub use history::{
    DEFAULT_HISTORY_LIMIT, DeleteOperation, OperationHistory, OperationItem, OperationKind,
    OperationStats,
};
pub use operation::{OperationError, describe_failure};
pub use progress::{DeletePhase, DeleteProgress, DeleteSummary};
pub use selection::SelectionSet;
pub use validate::{
    BatchValidation, RECENT_WINDOW, RiskWarning, VERY_LARGE_THRESHOLD,
    Validation, validate_entries, validate_entry,
};
