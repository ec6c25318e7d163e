// Metadata extraction and writing (exiftool)

pub mod exiftool;

use std::path::Path;

use crate::error::Result;

pub use exiftool::ExifToolWriter;

/// Writes a single tag to a media file.
///
/// Implementations must back the file up first, add `comment` to the file's
/// UserComment, and fail as a whole if either write fails.
pub trait TagWriter {
    fn set_tag(&self, path: &Path, tag: &str, value: &str, comment: &str) -> Result<()>;
}

/// Convert an exiftool JSON value to the string form the checks work on.
/// Null and empty strings count as missing.
pub fn value_to_string(val: &serde_json::Value) -> Option<String> {
    match val {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
