//! Name, size and path classification rules.
//!
//! Everything here is a pure function of its inputs. The temp and system
//! checks are heuristics; they flag candidates, they do not prove anything.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// One kibibyte.
pub const KIB: u64 = 1024;
/// One mebibyte.
pub const MIB: u64 = 1024 * KIB;
/// One gibibyte.
pub const GIB: u64 = 1024 * MIB;

/// Media files above this size get the `large` flag.
pub const LARGE_MEDIA_THRESHOLD: u64 = 100 * MIB;

/// Coarse file classification derived from the extension.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FileType {
    Image,
    Video,
    Audio,
    Document,
    Code,
    Archive,
    Executable,
    System,
    Unknown,
}

impl FileType {
    /// Classify a file by its name.
    pub fn from_name(name: &str) -> Self {
        match extension(name) {
            Some(ext) => Self::from_extension(&ext),
            None => Self::Unknown,
        }
    }

    /// Classify a lowercase extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "ico" | "tiff" | "tif"
            | "raw" | "cr2" => Self::Image,
            "mp4" | "avi" | "mov" | "mkv" | "wmv" | "flv" | "webm" | "m4v" | "mpg" | "mpeg"
            | "3gp" | "ogv" => Self::Video,
            "mp3" | "wav" | "flac" | "aac" | "ogg" | "m4a" | "wma" | "opus" => Self::Audio,
            "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "txt" | "rtf" | "odt"
            | "ods" | "odp" => Self::Document,
            "js" | "html" | "css" | "php" | "py" | "java" | "cpp" | "c" | "cs" | "rb" | "go"
            | "rs" | "ts" | "jsx" | "vue" | "scss" | "json" | "xml" | "yaml" | "yml" => {
                Self::Code
            }
            "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz" => Self::Archive,
            "exe" | "msi" | "app" | "deb" | "rpm" | "dmg" | "pkg" | "run" => Self::Executable,
            "dll" | "sys" | "ini" | "cfg" | "conf" | "log" => Self::System,
            _ => Self::Unknown,
        }
    }

    /// Check if this is an image, video or audio type.
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::Audio)
    }

    /// Icon tag for files of this type.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "music",
            Self::Document => "file-text",
            Self::Code => "code",
            Self::Archive => "file-archive",
            Self::Executable => "cogs",
            Self::System => "cog",
            Self::Unknown => "file",
        }
    }
}

/// Icon tag for directories.
pub const FOLDER_ICON: &str = "folder";

/// Icon tag for an entry.
pub fn icon_for(name: &str, is_directory: bool) -> &'static str {
    if is_directory {
        FOLDER_ICON
    } else {
        FileType::from_name(name).icon()
    }
}

/// Coarse size bucket used for histograms.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SizeBucket {
    /// Under 1 KiB.
    Tiny,
    /// Under 1 MiB.
    Small,
    /// Under 100 MiB.
    Medium,
    /// Under 1 GiB.
    Large,
    /// 1 GiB and up.
    Huge,
}

impl SizeBucket {
    /// Bucket for a byte count.
    pub fn from_size(bytes: u64) -> Self {
        if bytes < KIB {
            Self::Tiny
        } else if bytes < MIB {
            Self::Small
        } else if bytes < 100 * MIB {
            Self::Medium
        } else if bytes < GIB {
            Self::Large
        } else {
            Self::Huge
        }
    }

    /// Human-readable size range of the bucket.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tiny => "< 1 KiB",
            Self::Small => "1 KiB-1 MiB",
            Self::Medium => "1-100 MiB",
            Self::Large => "100 MiB-1 GiB",
            Self::Huge => ">= 1 GiB",
        }
    }
}

/// Lowercased text after the last dot, if there is one.
pub fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Check if a name denotes a hidden entry.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

const TEMP_PREFIXES: &[&str] = &["temp", "tmp"];
const TEMP_SUFFIXES: &[&str] = &[".tmp", ".temp", ".cache", ".log", ".bak", ".backup", "~"];
const TEMP_NAMES: &[&str] = &["thumbs.db", ".ds_store"];
const TEMP_PATH_FRAGMENTS: &[&str] = &[
    "temp",
    "tmp",
    "cache",
    "logs",
    "backup",
    "recycle",
    "trash",
    "windows/temp",
    "appdata/local/temp",
];

/// Heuristic check for temporary, cache and backup files.
///
/// Matches on the name (prefixes, suffixes, well-known junk files) or on
/// any temp-like fragment anywhere in the path. Both are compared
/// case-insensitively.
pub fn is_temp_file(name: &str, path: &str) -> bool {
    let name = name.to_lowercase();
    let name_match = TEMP_PREFIXES.iter().any(|p| name.starts_with(p))
        || TEMP_SUFFIXES.iter().any(|s| name.ends_with(s))
        || TEMP_NAMES.contains(&name.as_str());
    if name_match {
        return true;
    }

    let path = path.to_lowercase();
    TEMP_PATH_FRAGMENTS.iter().any(|f| path.contains(f))
}

const SYSTEM_DIRECTORIES: &[&str] = &[
    "system32",
    "windows",
    "program files",
    "program files (x86)",
    "boot",
    "recovery",
    "system volume information",
    "bin",
    "sbin",
    "usr",
    "lib",
    "lib64",
    "etc",
    "proc",
    "sys",
];

/// Heuristic check for operating system directories.
pub fn is_system_directory(name: &str, path: &str) -> bool {
    let name = name.to_lowercase();
    let path = path.to_lowercase();
    SYSTEM_DIRECTORIES
        .iter()
        .any(|dir| name.contains(dir) || path.contains(dir))
}

/// Check if a file is an image, video or audio file above 100 MiB.
pub fn is_large_media_file(name: &str, size: u64) -> bool {
    FileType::from_name(name).is_media() && size > LARGE_MEDIA_THRESHOLD
}
