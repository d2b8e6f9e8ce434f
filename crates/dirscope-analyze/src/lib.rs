//! Analysis algorithms for dirscope.
//!
//! This crate provides pure, synchronous views over a scanned [`Entry`] tree:
//!
//! - **Statistics** - counts, totals, type and size histograms, permission counts
//! - **Duplicate detection** - group files by size and name
//! - **Cleanup suggestions** - temp, large, old and duplicate files, empty folders
//! - **Queries** - filter by type, size and date, search, sort and paginate
//! - **Export** - CSV and JSON renderings of files or a selection
//!
//! None of these touch the host; running one twice on the same tree gives
//! the same answer.
//!
//! # Duplicate Detection
//!
//! ```rust,ignore
//! use dirscope_analyze::{DuplicateFinder, DuplicateConfig};
//!
//! let finder = DuplicateFinder::new();
//! let report = finder.find_duplicates(&result.root);
//!
//! println!("Found {} duplicate groups", report.group_count());
//! println!("Wasted space: {} bytes", report.total_wasted_space);
//! ```
//!
//! # Queries
//!
//! ```rust,ignore
//! use dirscope_analyze::{flatten, Filter, Query};
//!
//! let files = flatten(&result.root);
//! let query = Query::builder().filter(Filter::Large).search("backup").build()?;
//! let page = query.run(&files);
//!
//! for entry in page.items {
//!     println!("{} {}", entry.size, entry.path);
//! }
//! ```

pub mod cleanup;
mod duplicates;
mod error;
pub mod export;
pub mod query;
mod stats;

pub use cleanup::{CleanupConfig, CleanupConfigBuilder, CleanupSuggestions, cleanup_suggestions};
pub use duplicates::{
    DuplicateConfig, DuplicateConfigBuilder, DuplicateFinder, DuplicateGroup, DuplicateReport,
    find_duplicates,
};
pub use error::{ExportError, QueryError};
pub use export::{ExportFormat, export_entries};
pub use query::{Filter, Query, QueryBuilder, QueryPage, SortDirection, SortField, SortSpec};
pub use stats::{
    EntrySummary, PermissionCounts, SizeDistribution, Stats, compute_stats, entries, flatten,
};

// Re-export core types
pub use dirscope_core::{Entry, FileType, ScanResult};
