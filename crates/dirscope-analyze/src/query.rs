//! Filter, search, sort and paginate a flattened file list.
//!
//! The stages always compose in the same order:
//! filter → search → sort → paginate.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use dirscope_core::classify::{self, GIB, MIB};
use dirscope_core::{Entry, FileType};

use crate::error::QueryError;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Files strictly above this size match [`Filter::Large`].
pub const LARGE_FILTER_THRESHOLD: u64 = 100 * MIB;

/// Files strictly above this size match [`Filter::Huge`].
pub const HUGE_FILTER_THRESHOLD: u64 = GIB;

/// Named subset of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every entry.
    #[default]
    All,
    /// Files only.
    Files,
    /// Directories only.
    Folders,
    /// Above 100 MiB.
    Large,
    /// Above 1 GiB.
    Huge,
    /// Matches the temp-file heuristic.
    Temp,
    /// Exact file type.
    Type(FileType),
}

impl Filter {
    /// Check if a file passes this filter.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Filter::All => true,
            Filter::Files => entry.is_file(),
            Filter::Folders => entry.is_dir(),
            Filter::Large => entry.is_file() && entry.size > LARGE_FILTER_THRESHOLD,
            Filter::Huge => entry.is_file() && entry.size > HUGE_FILTER_THRESHOLD,
            Filter::Temp => entry.is_file() && classify::is_temp_file(&entry.name, &entry.path),
            Filter::Type(file_type) => entry.file_type() == Some(*file_type),
        }
    }
}

impl FromStr for Filter {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "files" => Ok(Filter::Files),
            "folders" => Ok(Filter::Folders),
            "large" => Ok(Filter::Large),
            "huge" => Ok(Filter::Huge),
            "temp" => Ok(Filter::Temp),
            other => FileType::from_str(other)
                .map(Filter::Type)
                .map_err(|_| QueryError::UnknownFilter {
                    name: s.to_string(),
                }),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Files => f.write_str("files"),
            Filter::Folders => f.write_str("folders"),
            Filter::Large => f.write_str("large"),
            Filter::Huge => f.write_str("huge"),
            Filter::Temp => f.write_str("temp"),
            Filter::Type(file_type) => write!(f, "{file_type}"),
        }
    }
}

/// Field to sort by.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortField {
    Name,
    Path,
    #[default]
    Size,
    Modified,
    Type,
}

/// Sort direction.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Sort field plus direction; defaults to size descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a sort order.
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Compare two files under this ordering.
    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        let ordering = match self.field {
            SortField::Name => cmp_ignore_case(&a.name, &b.name),
            SortField::Path => cmp_ignore_case(&a.path, &b.path),
            SortField::Size => a.size.cmp(&b.size),
            SortField::Modified => a.last_modified.cmp(&b.last_modified),
            SortField::Type => a
                .file_type()
                .map(|t| t.as_ref().to_string())
                .cmp(&b.file_type().map(|t| t.as_ref().to_string())),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Parses `field` or `field:direction`, e.g. `name:asc`.
impl FromStr for SortSpec {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, direction)) => (field, Some(direction)),
            None => (s, None),
        };
        let field = SortField::from_str(field.trim()).map_err(|_| QueryError::UnknownSortField {
            name: field.to_string(),
        })?;
        let direction = match direction {
            Some(d) => SortDirection::from_str(d.trim())
                .map_err(|_| QueryError::UnknownSortDirection { name: d.to_string() })?,
            None => SortDirection::default(),
        };
        Ok(Self { field, direction })
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Keep files passing `filter`.
pub fn filter_entries<'a>(files: &[&'a Entry], filter: Filter) -> Vec<&'a Entry> {
    files.iter().copied().filter(|f| filter.matches(f)).collect()
}

/// Keep entries whose size lies in `min..=max`; a missing bound is open.
pub fn filter_by_size<'a>(
    entries: Vec<&'a Entry>,
    min: Option<u64>,
    max: Option<u64>,
) -> Vec<&'a Entry> {
    if min.is_none() && max.is_none() {
        return entries;
    }
    let min = min.unwrap_or(0);
    let max = max.unwrap_or(u64::MAX);
    entries
        .into_iter()
        .filter(|e| e.size >= min && e.size <= max)
        .collect()
}

/// Keep entries modified within `after..=before`; a missing bound is open.
///
/// With any bound set, entries without a modification time are dropped.
pub fn filter_by_modified<'a>(
    entries: Vec<&'a Entry>,
    after: Option<SystemTime>,
    before: Option<SystemTime>,
) -> Vec<&'a Entry> {
    if after.is_none() && before.is_none() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|e| match e.last_modified {
            Some(t) => after.is_none_or(|a| t >= a) && before.is_none_or(|b| t <= b),
            None => false,
        })
        .collect()
}

/// Keep files whose name or path contains `term`, ignoring case.
///
/// An empty term keeps everything.
pub fn search_entries<'a>(files: Vec<&'a Entry>, term: &str) -> Vec<&'a Entry> {
    if term.is_empty() {
        return files;
    }
    let term = term.to_lowercase();
    files
        .into_iter()
        .filter(|f| f.name.to_lowercase().contains(&term) || f.path.to_lowercase().contains(&term))
        .collect()
}

/// Stable sort in place.
pub fn sort_entries(files: &mut [&Entry], sort: SortSpec) {
    files.sort_by(|a, b| sort.compare(a, b));
}

/// Slice out one 1-indexed page; out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// One page of query results.
#[derive(Debug, Clone)]
pub struct QueryPage<'a> {
    /// Files on this page.
    pub items: Vec<&'a Entry>,
    /// Files matching filter and search across all pages.
    pub total_matching: usize,
    /// Requested page (1-indexed).
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl QueryPage<'_> {
    /// Check if a following page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Check if a preceding page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// A complete view query over a flattened file list.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Query {
    #[builder(default)]
    #[serde(default)]
    pub filter: Filter,

    /// Case-insensitive substring over name and path.
    #[builder(default)]
    #[serde(default)]
    pub search: String,

    #[builder(default)]
    #[serde(default)]
    pub sort: SortSpec,

    /// 1-indexed page.
    #[builder(default = "1")]
    #[serde(default = "default_page")]
    pub page: usize,

    #[builder(default = "DEFAULT_PAGE_SIZE")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Inclusive lower size bound in bytes.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub min_size: Option<u64>,

    /// Inclusive upper size bound in bytes.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub max_size: Option<u64>,

    /// Inclusive lower bound on modification time.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub modified_after: Option<SystemTime>,

    /// Inclusive upper bound on modification time.
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub modified_before: Option<SystemTime>,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl QueryBuilder {
    fn validate(&self) -> Result<(), String> {
        check_bounds(
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            self.min_size.flatten(),
            self.max_size.flatten(),
            self.modified_after.flatten(),
            self.modified_before.flatten(),
        )
        .map_err(|err| err.to_string())
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            search: String::new(),
            sort: SortSpec::default(),
            page: default_page(),
            page_size: default_page_size(),
            min_size: None,
            max_size: None,
            modified_after: None,
            modified_before: None,
        }
    }
}

fn check_bounds(
    page_size: usize,
    min_size: Option<u64>,
    max_size: Option<u64>,
    modified_after: Option<SystemTime>,
    modified_before: Option<SystemTime>,
) -> Result<(), QueryError> {
    let invalid = |message: &str| {
        Err(QueryError::Invalid {
            message: message.to_string(),
        })
    };
    if page_size == 0 {
        return invalid("page_size must be greater than zero");
    }
    if matches!((min_size, max_size), (Some(min), Some(max)) if min > max) {
        return invalid("min_size is greater than max_size");
    }
    if matches!((modified_after, modified_before), (Some(after), Some(before)) if after > before) {
        return invalid("modified_after is later than modified_before");
    }
    Ok(())
}

impl Query {
    /// Create a new query builder.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Check the page size and range bounds.
    ///
    /// Queries from the builder are already checked; deserialized ones
    /// are not.
    pub fn check(&self) -> Result<(), QueryError> {
        check_bounds(
            self.page_size,
            self.min_size,
            self.max_size,
            self.modified_after,
            self.modified_before,
        )
    }

    /// Filtered, searched and sorted entries, before pagination.
    pub fn matching<'a>(&self, files: &[&'a Entry]) -> Vec<&'a Entry> {
        let filtered = filter_entries(files, self.filter);
        let filtered = filter_by_size(filtered, self.min_size, self.max_size);
        let filtered = filter_by_modified(filtered, self.modified_after, self.modified_before);
        let mut matching = search_entries(filtered, &self.search);
        sort_entries(&mut matching, self.sort);
        matching
    }

    /// Run all four stages and return the requested page.
    pub fn run<'a>(&self, files: &[&'a Entry]) -> QueryPage<'a> {
        let matching = self.matching(files);
        let total_matching = matching.len();
        let total_pages = if self.page_size == 0 {
            0
        } else {
            total_matching.div_ceil(self.page_size)
        };
        QueryPage {
            items: paginate(&matching, self.page, self.page_size).to_vec(),
            total_matching,
            page: self.page,
            page_size: self.page_size,
            total_pages,
        }
    }
}
