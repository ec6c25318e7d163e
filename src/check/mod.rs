// Per-file consistency checks
//
// check_media runs the sub-checks in a fixed order:
//   1. cache freshness (stops everything else on mismatch)
//   2. unknown timestamp-looking tags (warning only)
//   3. GPS coordinate
//   4. GPS datetime
//   5. filename timestamp
//   6. original datetime
//   7. missing original datetime fallback
//   8. timezone offset
// Each sub-check returns its diagnostics together with the value later
// steps consume.

pub mod datetime;
pub mod fix;
pub mod gps;
pub mod offset;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::fmt;

use crate::db::{get_media_mtime, schema::MediaRecord};
use crate::tags;

pub use datetime::FilenameTimestamp;
pub use fix::{Fix, OffsetResolver};

/// One problem found for a record, optionally with a proposed fix.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub fix: Option<Fix>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fix: None,
        }
    }

    pub fn with_fix(message: impl Into<String>, fix: Fix) -> Self {
        Self {
            message: message.into(),
            fix: Some(fix),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Diagnostics of one sub-check plus the value it computed, if any.
#[derive(Debug)]
pub struct Checked<T> {
    pub diagnostics: Vec<Diagnostic>,
    pub value: Option<T>,
}

impl<T> Checked<T> {
    pub fn ok(value: T) -> Self {
        Self {
            diagnostics: Vec::new(),
            value: Some(value),
        }
    }

    pub fn none() -> Self {
        Self {
            diagnostics: Vec::new(),
            value: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            diagnostics: vec![Diagnostic::error(message)],
            value: None,
        }
    }

    /// Move the diagnostics into `out`, hand back the value.
    pub fn drain_into(self, out: &mut Vec<Diagnostic>) -> Option<T> {
        out.extend(self.diagnostics);
        self.value
    }
}

/// State shared by all checks of one run: the tags already reported as
/// unknown, and the resolver GPS offset fixes use.
pub struct CheckSession {
    seen_tags: HashSet<String>,
    resolver: OffsetResolver,
}

impl Default for CheckSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckSession {
    pub fn new() -> Self {
        Self::with_resolver(crate::geo::offset_for_point)
    }

    pub fn with_resolver(resolver: OffsetResolver) -> Self {
        Self {
            seen_tags: tags::tags_with_colon().map(str::to_string).collect(),
            resolver,
        }
    }

    pub fn resolver(&self) -> OffsetResolver {
        self.resolver
    }

    /// Warn about tags with colon-containing values that nothing knows about.
    /// Each tag is reported once per session. Returns the newly reported tags.
    pub fn detect_datetimeish_tags(&mut self, record: &MediaRecord) -> Vec<String> {
        let mut reported = Vec::new();
        for (tag, value) in &record.metadata {
            if self.seen_tags.contains(tag) {
                continue;
            }
            // no YYYY-mm-dd dates seen in exiftool output, so ':' is enough
            if !value.contains(':') {
                continue;
            }
            self.seen_tags.insert(tag.clone());
            log::warn!(
                "{} : tag {} with value {} contains a colon, might be worth adding it to the tag catalog",
                record.path, tag, value
            );
            reported.push(tag.clone());
        }
        reported
    }
}

/// Compare the cached mtime with the file on disk.
pub fn check_freshness(record: &MediaRecord) -> Option<Diagnostic> {
    match get_media_mtime(record.file_path()) {
        Ok(current) if current == record.mtime => None,
        Ok(current) => Some(Diagnostic::error(format!(
            "file mtime {} and db mtime {} are different! please update the cache",
            current, record.mtime
        ))),
        Err(e) => Some(Diagnostic::error(format!(
            "couldn't read file mtime ({}), db mtime {}. please update the cache",
            e, record.mtime
        ))),
    }
}

/// Run every check for one record, in order.
pub fn check_media(session: &mut CheckSession, record: &MediaRecord) -> Vec<Diagnostic> {
    if let Some(stale) = check_freshness(record) {
        return vec![stale];
    }

    session.detect_datetimeish_tags(record);

    let mut out = Vec::new();

    let coordinate = gps::check_coordinate(record).drain_into(&mut out);
    // parsed for its diagnostics, nothing downstream compares against it
    let _gps_datetime = gps::check_gps_datetime(record).drain_into(&mut out);
    let filename_datetime = datetime::check_filename_datetime(record).drain_into(&mut out);
    let original_datetime = datetime::check_original_datetime(record).drain_into(&mut out);

    if original_datetime.is_none() {
        out.extend(datetime::check_missing_original_datetime(
            record,
            filename_datetime.as_ref(),
        ));
    }

    if offset::supports_tz_offset(record) {
        let _offset = offset::check_tz_offset(
            record,
            coordinate.as_ref(),
            original_datetime,
            session.resolver(),
        )
        .drain_into(&mut out);
    }

    out
}

/// Does the record's MIMEType match one of `mimes`?
pub(crate) fn mime_in(record: &MediaRecord, mimes: &[&str]) -> bool {
    record.mime().map_or(false, |m| mimes.contains(&m))
}

/// `{Tag: "value", ...}` for the tags of `candidates` that have a value.
pub(crate) fn collect_present<'a>(
    record: &'a MediaRecord,
    candidates: impl IntoIterator<Item = &'static str>,
) -> Vec<(&'static str, &'a str)> {
    candidates
        .into_iter()
        .filter_map(|tag| record.get(tag).map(|v| (tag, v)))
        .collect()
}

pub(crate) fn format_tag_values(values: &[(&str, &str)]) -> String {
    let inner: Vec<String> = values
        .iter()
        .map(|(tag, value)| format!("{}: {:?}", tag, value))
        .collect();
    format!("{{{}}}", inner.join(", "))
}
