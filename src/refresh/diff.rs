// Tag-level diff between a cached exiftool snapshot and a fresh one

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::{MediaCheckError, Result};

/// Tags that change on every write or that tools shuffle around; never compared.
pub const EXIF_DIFF_EXCLUDE: [&str; 21] = [
    // always change on update
    "FileAccessDate",
    "FileModifyDate",
    "FileInodeChangeDate",
    "FileSize",
    // digikam GPS updates
    "JFIFVersion",
    "ThumbnailOffset",
    "XMPToolkit",
    // tag edits
    "CurrentIPTCDigest",
    "CodedCharacterSet",
    "ExifByteOrder",
    "InteropIndex",
    "InteropVersion",
    "EnvelopeRecordVersion",
    "ApplicationRecordVersion",
    // offsets move when EXIF grows
    "OtherImageStart",
    "MPImageStart",
    // appear when an image had no tags before
    "YCbCrPositioning",
    "ColorSpace",
    "ExifVersion",
    "FlashpixVersion",
    "ComponentsConfiguration",
];

/// Tags expected to change between refreshes: keywords, captions, and the
/// timestamps/offsets the fixes write.
pub const EXIF_DIFF_ALLOW: [&str; 26] = [
    // keywords, digikam writes all of them
    "CatalogSets",
    "Categories",
    "HierarchicalSubject",
    "Keywords",
    "XPKeywords",
    "TagsList",
    "LastKeywordXMP",
    "Subject",
    "Comment",
    "UserComment",
    "Description",
    "Caption-Abstract",
    "Notes",
    "ImageDescription",
    "GPSMapDatum",
    "GPSVersionID",
    "Warning",
    "DateTimeOriginal",
    "OffsetTimeOriginal",
    "SubSecDateTimeOriginal",
    "SubSecTimeOriginal",
    "DateTime",
    "DateCreated",
    "DateTimeCreated",
    "TimeCreated",
    "MetadataDate",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TagChange {
    pub tag: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

fn show(value: &Option<Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

impl TagChange {
    pub fn before_str(&self) -> String {
        show(&self.before)
    }

    pub fn after_str(&self) -> String {
        show(&self.after)
    }
}

/// Changed tags between two snapshots of `path`, sorted by tag name.
/// A change to a tag outside EXIF_DIFF_ALLOW is an error.
pub fn diff_exif(path: &str, old: &Map<String, Value>, new: &Map<String, Value>) -> Result<Vec<TagChange>> {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    let mut changes = Vec::new();
    for key in keys {
        if EXIF_DIFF_EXCLUDE.contains(&key.as_str()) {
            continue;
        }
        let before = old.get(key).filter(|v| !v.is_null()).cloned();
        let after = new.get(key).filter(|v| !v.is_null()).cloned();
        if before == after {
            continue;
        }

        let change = TagChange {
            tag: key.clone(),
            before,
            after,
        };
        if !EXIF_DIFF_ALLOW.contains(&key.as_str()) {
            return Err(MediaCheckError::UnexpectedChange {
                path: path.to_string(),
                tag: change.tag.clone(),
                before: change.before_str(),
                after: change.after_str(),
            });
        }
        changes.push(change);
    }

    Ok(changes)
}
