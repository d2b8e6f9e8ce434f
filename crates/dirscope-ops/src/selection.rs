//! Path-keyed selection of entries.

use indexmap::IndexMap;

use dirscope_analyze::{ExportError, ExportFormat, export_entries};
use dirscope_core::Entry;

/// Entries chosen for a bulk operation, keyed by path in selection order.
///
/// Only paths and sizes are held, so a selection survives re-scans; use
/// [`SelectionSet::resolve`] to map it back onto a tree.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    items: IndexMap<String, u64>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Returns false if it was already selected.
    pub fn select(&mut self, entry: &Entry) -> bool {
        self.items.insert(entry.path.clone(), entry.size).is_none()
    }

    /// Remove a path. Returns true if it was selected.
    pub fn deselect(&mut self, path: &str) -> bool {
        self.items.shift_remove(path).is_some()
    }

    /// Flip membership; returns the new state.
    pub fn toggle(&mut self, entry: &Entry) -> bool {
        if self.deselect(&entry.path) {
            false
        } else {
            self.select(entry);
            true
        }
    }

    /// Add every entry yielded.
    pub fn select_all<'a>(&mut self, entries: impl IntoIterator<Item = &'a Entry>) {
        for entry in entries {
            self.select(entry);
        }
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, path: &str) -> bool {
        self.items.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the sizes recorded at selection time.
    pub fn total_size(&self) -> u64 {
        self.items.values().sum()
    }

    /// Selected paths in selection order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Entries of `root` that are selected, in selection order.
    ///
    /// Paths not present in the tree are skipped.
    pub fn resolve<'r>(&self, root: &'r Entry) -> Vec<&'r Entry> {
        self.items.keys().filter_map(|path| root.find(path)).collect()
    }

    /// Render the selected entries of `root` as CSV or JSON.
    ///
    /// Fails with [`ExportError::NothingSelected`] when nothing resolves.
    pub fn export(&self, root: &Entry, format: ExportFormat) -> Result<String, ExportError> {
        export_entries(&self.resolve(root), format)
    }

    /// Drop paths not present in `root`; returns how many were dropped.
    pub fn prune(&mut self, root: &Entry) -> usize {
        let before = self.items.len();
        self.items.retain(|path, _| root.find(path).is_some());
        before - self.items.len()
    }
}
