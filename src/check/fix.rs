// Proposed tag fixes
//
// A Fix carries everything it needs to describe and apply itself, so the
// reconcile loop can hold on to it after the record is gone.

use std::cell::OnceCell;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::check::FilenameTimestamp;
use crate::constants::{EXIF_DATETIME_FORMAT, EXIF_SUBSEC_DATETIME_FORMAT, MIME_JPEG};
use crate::db::schema::MediaRecord;
use crate::error::{MediaCheckError, Result};
use crate::geo::Coordinate;
use crate::metadata::TagWriter;
use crate::tags;

/// Computes the `±HH:MM` offset in effect at a point and local time.
pub type OffsetResolver = fn(&Coordinate, NaiveDateTime) -> Result<String>;

#[derive(Debug, Clone)]
pub enum Fix {
    /// Set the capture time from the timestamp embedded in the filename.
    FromFilename {
        path: String,
        mime: Option<String>,
        filename: String,
        tag: &'static str,
        timestamp: NaiveDateTime,
        has_subsec: bool,
    },
    /// Copy OffsetTime into OffsetTimeOriginal.
    OffsetFromOtherTag {
        path: String,
        mime: Option<String>,
        source: &'static str,
        value: String,
    },
    /// Infer OffsetTimeOriginal from the GPS position and the local capture time.
    OffsetFromGps {
        path: String,
        mime: Option<String>,
        coordinate: Coordinate,
        local: NaiveDateTime,
        resolver: OffsetResolver,
        // Timezone lookup is slow, resolve at most once
        offset: OnceCell<std::result::Result<String, String>>,
    },
}

impl Fix {
    pub fn from_filename(record: &MediaRecord, ts: FilenameTimestamp) -> Self {
        let tag = if ts.has_subsec {
            tags::SUB_SEC_DATE_TIME_ORIGINAL
        } else {
            tags::DATE_TIME_ORIGINAL
        };
        Fix::FromFilename {
            path: record.path.clone(),
            mime: record.mime().map(str::to_string),
            filename: record.filename(),
            tag,
            timestamp: ts.timestamp,
            has_subsec: ts.has_subsec,
        }
    }

    pub fn offset_from_other_tag(record: &MediaRecord, source: &'static str, value: &str) -> Self {
        Fix::OffsetFromOtherTag {
            path: record.path.clone(),
            mime: record.mime().map(str::to_string),
            source,
            value: value.to_string(),
        }
    }

    pub fn offset_from_gps(
        record: &MediaRecord,
        coordinate: Coordinate,
        local: NaiveDateTime,
        resolver: OffsetResolver,
    ) -> Self {
        Fix::OffsetFromGps {
            path: record.path.clone(),
            mime: record.mime().map(str::to_string),
            coordinate,
            local,
            resolver,
            offset: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Fix::FromFilename { path, .. }
            | Fix::OffsetFromOtherTag { path, .. }
            | Fix::OffsetFromGps { path, .. } => path,
        }
    }

    fn mime(&self) -> Option<&str> {
        match self {
            Fix::FromFilename { mime, .. }
            | Fix::OffsetFromOtherTag { mime, .. }
            | Fix::OffsetFromGps { mime, .. } => mime.as_deref(),
        }
    }

    /// The tag this fix writes.
    pub fn target_tag(&self) -> &'static str {
        match self {
            Fix::FromFilename { tag, .. } => tag,
            Fix::OffsetFromOtherTag { .. } | Fix::OffsetFromGps { .. } => tags::OFFSET_TIME_ORIGINAL,
        }
    }

    /// Resolved offset of a GPS fix. Always None for the other variants.
    pub fn offset(&self) -> Option<&std::result::Result<String, String>> {
        match self {
            Fix::OffsetFromGps {
                coordinate,
                local,
                resolver,
                offset,
                ..
            } => Some(resolve_once(offset, *resolver, coordinate, *local)),
            _ => None,
        }
    }

    /// The value that would be written.
    fn value(&self) -> Result<String> {
        match self {
            Fix::FromFilename {
                timestamp,
                has_subsec,
                ..
            } => {
                let fmt = if *has_subsec {
                    EXIF_SUBSEC_DATETIME_FORMAT
                } else {
                    EXIF_DATETIME_FORMAT
                };
                Ok(timestamp.format(fmt).to_string())
            }
            Fix::OffsetFromOtherTag { value, .. } => Ok(value.clone()),
            Fix::OffsetFromGps {
                coordinate,
                local,
                resolver,
                offset,
                ..
            } => resolve_once(offset, *resolver, coordinate, *local)
                .clone()
                .map_err(MediaCheckError::TimeZone),
        }
    }

    /// One-line summary shown before asking to apply.
    pub fn describe(&self) -> String {
        match self {
            Fix::FromFilename {
                tag,
                filename,
                timestamp,
                ..
            } => format!(
                "Set {} from the filename? {}. Timestamp will be {}",
                tag, filename, timestamp
            ),
            Fix::OffsetFromOtherTag { source, value, .. } => format!(
                "Set {} from {}? ({})",
                tags::OFFSET_TIME_ORIGINAL,
                source,
                value
            ),
            Fix::OffsetFromGps {
                coordinate,
                local,
                resolver,
                offset,
                ..
            } => match resolve_once(offset, *resolver, coordinate, *local) {
                Ok(offset) => format!("Set {} to {}?", tags::OFFSET_TIME_ORIGINAL, offset),
                Err(e) => format!("Can't infer {} from GPS: {}", tags::OFFSET_TIME_ORIGINAL, e),
            },
        }
    }

    fn comment(&self) -> String {
        match self {
            Fix::FromFilename { tag, filename, .. } => {
                format!("inferred {} from the filename {}", tag, filename)
            }
            Fix::OffsetFromOtherTag { source, .. } => {
                format!("inferred {} from {}", tags::OFFSET_TIME_ORIGINAL, source)
            }
            Fix::OffsetFromGps { .. } => format!("inferred {} from GPS", tags::OFFSET_TIME_ORIGINAL),
        }
    }

    /// Write the tag through `writer`. Only JPEG files are supported; anything
    /// else is refused before touching the file.
    pub fn apply(&self, writer: &dyn TagWriter) -> Result<()> {
        if self.mime() != Some(MIME_JPEG) {
            return Err(MediaCheckError::UnsupportedFix {
                path: self.path().to_string(),
                reason: format!(
                    "only {} is supported, got {}",
                    MIME_JPEG,
                    self.mime().unwrap_or("unknown MIME type")
                ),
            });
        }

        let value = self.value()?;
        log::info!("{} : setting {} to {}", self.path(), self.target_tag(), value);
        writer.set_tag(Path::new(self.path()), self.target_tag(), &value, &self.comment())
    }
}

fn resolve_once<'a>(
    cell: &'a OnceCell<std::result::Result<String, String>>,
    resolver: OffsetResolver,
    coordinate: &Coordinate,
    local: NaiveDateTime,
) -> &'a std::result::Result<String, String> {
    cell.get_or_init(|| resolver(coordinate, local).map_err(|e| e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingWriter {
        calls: RefCell<Vec<(PathBuf, String, String, String)>>,
    }

    impl TagWriter for RecordingWriter {
        fn set_tag(&self, path: &Path, tag: &str, value: &str, comment: &str) -> Result<()> {
            self.calls.borrow_mut().push((
                path.to_path_buf(),
                tag.to_string(),
                value.to_string(),
                comment.to_string(),
            ));
            Ok(())
        }
    }

    fn record(path: &str, mime: &str) -> MediaRecord {
        let mut metadata = BTreeMap::new();
        metadata.insert("MIMEType".to_string(), mime.to_string());
        MediaRecord::new(path, "2020-01-01T00:00:00+00:00", metadata)
    }

    fn local(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    static RESOLVER_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counting_resolver(_: &Coordinate, _: NaiveDateTime) -> Result<String> {
        RESOLVER_CALLS.fetch_add(1, Ordering::SeqCst);
        Ok("+02:00".to_string())
    }

    fn failing_resolver(_: &Coordinate, _: NaiveDateTime) -> Result<String> {
        Err(MediaCheckError::TimeZone("no timezone found".to_string()))
    }

    #[test]
    fn test_from_filename_plain() {
        let r = record("/p/IMG_20200101_123456.jpg", "image/jpeg");
        let fix = Fix::from_filename(
            &r,
            FilenameTimestamp {
                timestamp: local("2020-01-01 12:34:56"),
                has_subsec: false,
            },
        );
        assert_eq!(
            fix.describe(),
            "Set DateTimeOriginal from the filename? IMG_20200101_123456.jpg. Timestamp will be 2020-01-01 12:34:56"
        );

        let writer = RecordingWriter::default();
        fix.apply(&writer).unwrap();
        let calls = writer.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("/p/IMG_20200101_123456.jpg"));
        assert_eq!(calls[0].1, "DateTimeOriginal");
        assert_eq!(calls[0].2, "2020:01:01 12:34:56");
        assert_eq!(
            calls[0].3,
            "inferred DateTimeOriginal from the filename IMG_20200101_123456.jpg"
        );
    }

    #[test]
    fn test_from_filename_subsec() {
        let r = record("/p/PXL_20210704_201510123.jpg", "image/jpeg");
        let fix = Fix::from_filename(
            &r,
            FilenameTimestamp {
                timestamp: local("2021-07-04 20:15:10.123"),
                has_subsec: true,
            },
        );
        assert_eq!(fix.target_tag(), "SubSecDateTimeOriginal");

        let writer = RecordingWriter::default();
        fix.apply(&writer).unwrap();
        assert_eq!(writer.calls.borrow()[0].2, "2021:07:04 20:15:10.123000");
    }

    #[test]
    fn test_offset_from_other_tag() {
        let r = record("/p/IMG_1.jpg", "image/jpeg");
        let fix = Fix::offset_from_other_tag(&r, "OffsetTime", "+01:00");
        assert_eq!(fix.target_tag(), "OffsetTimeOriginal");
        assert_eq!(fix.describe(), "Set OffsetTimeOriginal from OffsetTime? (+01:00)");

        let writer = RecordingWriter::default();
        fix.apply(&writer).unwrap();
        let calls = writer.calls.borrow();
        assert_eq!(calls[0].1, "OffsetTimeOriginal");
        assert_eq!(calls[0].2, "+01:00");
        assert_eq!(calls[0].3, "inferred OffsetTimeOriginal from OffsetTime");
    }

    #[test]
    fn test_gps_offset_resolved_once() {
        let r = record("/p/IMG_1.jpg", "image/jpeg");
        let fix = Fix::offset_from_gps(
            &r,
            Coordinate::new("52.5 N", "13.4 E"),
            local("2020-05-01 12:00:00"),
            counting_resolver,
        );
        let before = RESOLVER_CALLS.load(Ordering::SeqCst);

        let first = fix.describe();
        let second = fix.describe();
        assert_eq!(first, "Set OffsetTimeOriginal to +02:00?");
        assert_eq!(first, second);

        let writer = RecordingWriter::default();
        fix.apply(&writer).unwrap();
        assert_eq!(writer.calls.borrow()[0].2, "+02:00");
        assert_eq!(writer.calls.borrow()[0].3, "inferred OffsetTimeOriginal from GPS");

        assert_eq!(RESOLVER_CALLS.load(Ordering::SeqCst) - before, 1);
    }

    #[test]
    fn test_gps_offset_failure() {
        let r = record("/p/IMG_1.jpg", "image/jpeg");
        let fix = Fix::offset_from_gps(
            &r,
            Coordinate::new("0 N", "0 E"),
            local("2020-05-01 12:00:00"),
            failing_resolver,
        );
        assert!(fix.describe().starts_with("Can't infer OffsetTimeOriginal from GPS"));

        let writer = RecordingWriter::default();
        let err = fix.apply(&writer).unwrap_err();
        assert!(matches!(err, MediaCheckError::TimeZone(_)));
        assert!(writer.calls.borrow().is_empty());
    }

    #[test]
    fn test_non_jpeg_is_refused() {
        let r = record("/p/VID_20200101_123456.mp4", "video/mp4");
        let fix = Fix::from_filename(
            &r,
            FilenameTimestamp {
                timestamp: local("2020-01-01 12:34:56"),
                has_subsec: false,
            },
        );
        let writer = RecordingWriter::default();
        let err = fix.apply(&writer).unwrap_err();
        assert!(matches!(err, MediaCheckError::UnsupportedFix { .. }));
        assert!(writer.calls.borrow().is_empty());
    }

    #[test]
    fn test_offset_only_for_gps_variant() {
        let r = record("/p/IMG_1.jpg", "image/jpeg");
        let fix = Fix::offset_from_other_tag(&r, "OffsetTime", "+01:00");
        assert!(fix.offset().is_none());
    }
}
