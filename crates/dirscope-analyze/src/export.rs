//! CSV and JSON export of derived data.

use chrono::{DateTime, SecondsFormat, Utc};
use humansize::{BINARY, format_size};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use dirscope_core::{Entry, FileType};

use crate::error::ExportError;

/// Output format for [`export_entries`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Header row of [`to_csv`].
pub const CSV_HEADER: &str = "Name,Size (Bytes),Size,Type,Path,Modified";

/// Render files as CSV, one row per entry.
///
/// Text columns are quoted with embedded quotes doubled. Modification
/// times are ISO-8601 in UTC, or `Unknown`.
pub fn to_csv(files: &[&Entry]) -> String {
    let mut out = String::from(CSV_HEADER);
    for file in files {
        let file_type = file.file_type().unwrap_or(FileType::Unknown);
        let modified = file
            .last_modified
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| "Unknown".to_string());

        out.push('\n');
        out.push_str(&format!(
            "{},{},{},{},{},{}",
            quote(&file.name),
            file.size,
            quote(&format_size(file.size, BINARY)),
            quote(file_type.as_ref()),
            quote(&file.path),
            quote(&modified),
        ));
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Pretty-printed JSON of any serializable value (a scan result, stats, a file list).
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Render a chosen set of entries; an empty set is an error.
pub fn export_entries(entries: &[&Entry], format: ExportFormat) -> Result<String, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::NothingSelected);
    }
    match format {
        ExportFormat::Csv => Ok(to_csv(entries)),
        ExportFormat::Json => Ok(to_json(entries)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_csv_rows() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
        let a = Entry::new_file("say \"hi\".txt", "root/say \"hi\".txt", 2048).with_modified(modified);
        let b = Entry::placeholder("locked", "root/locked", "Access denied");

        let csv = to_csv(&[&a, &b]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "\"say \"\"hi\"\".txt\",2048,\"2 KiB\",\"document\",\"root/say \"\"hi\"\".txt\",\"1970-01-02T00:00:00.000Z\""
        );
        assert_eq!(lines[2], "\"locked\",0,\"0 B\",\"unknown\",\"root/locked\",\"Unknown\"");
    }

    #[test]
    fn test_json_is_pretty() {
        let entry = Entry::new_file("a.txt", "root/a.txt", 1);
        let json = to_json(&entry).unwrap();
        assert!(json.contains("\n  \"name\": \"a.txt\""));
    }

    #[test]
    fn test_export_entries_rejects_empty_set() {
        let err = export_entries(&[], ExportFormat::Csv).unwrap_err();
        assert!(matches!(err, ExportError::NothingSelected));
        assert_eq!(err.to_string(), "No items selected for export");
    }

    #[test]
    fn test_export_entries_formats() {
        let entry = Entry::new_file("a.txt", "root/a.txt", 3);
        let csv = export_entries(&[&entry], ExportFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 2);

        let json = export_entries(&[&entry], "JSON".parse().unwrap()).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"path\": \"root/a.txt\""));
    }
}
