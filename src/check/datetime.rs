// Capture time checks: filename timestamp, original datetime tag, and the
// fallback when the original datetime is missing

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::check::{collect_present, format_tag_values, mime_in, Checked, Diagnostic, Fix};
use crate::constants::{EXIF_DATETIME_FORMAT, MAX_SANE_YEAR, MIME_MP4, MIME_QUICKTIME, MIN_SANE_YEAR};
use crate::db::schema::MediaRecord;
use crate::tags;

// Optional free-text prefix, YYYYMMDD, then HHMMSSmmm or HHMMSS[_mmm].
// ASCII digits only, the captures are sliced by byte
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[\w\s]+_)?([0-9]{8})_([0-9]{9}|[0-9]{6}(?:_[0-9]{3})?)").unwrap()
});

/// Local capture time recovered from a filename like `IMG_20200101_123456.jpg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenameTimestamp {
    pub timestamp: NaiveDateTime,
    /// The time block had milliseconds
    pub has_subsec: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameTimestampError {
    NoMatch,
    InvalidDate,
}

/// Drop every suffix: `a.tar.gz` -> `a`. Leading dots are part of the name.
pub fn strip_suffixes(name: &str) -> &str {
    if name.ends_with('.') {
        return name;
    }
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].find('.') {
        Some(i) => &name[..leading + i],
        None => name,
    }
}

/// Parse the timestamp embedded in a filename (suffixes included or not).
pub fn parse_filename_timestamp(filename: &str) -> Result<FilenameTimestamp, FilenameTimestampError> {
    let name = strip_suffixes(filename);
    let caps = FILENAME_RE
        .captures(name)
        .ok_or(FilenameTimestampError::NoMatch)?;

    let date = &caps[1];
    // milliseconds are sometimes separated with an underscore
    let time = caps[2].replace('_', "");
    let has_subsec = time.len() == 9;

    let num = |s: &str| s.parse::<u32>().map_err(|_| FilenameTimestampError::InvalidDate);
    let year = date[0..4].parse::<i32>().map_err(|_| FilenameTimestampError::InvalidDate)?;
    let month = num(&date[4..6])?;
    let day = num(&date[6..8])?;
    let hour = num(&time[0..2])?;
    let minute = num(&time[2..4])?;
    let second = num(&time[4..6])?;
    let millis = if has_subsec { num(&time[6..9])? } else { 0 };

    // chrono's proleptic calendar has a year 0, EXIF dates don't
    if year < 1 {
        return Err(FilenameTimestampError::InvalidDate);
    }

    // and_hms_milli_opt accepts second 59 + 1000..1999 ms as a leap second, we don't
    if second > 59 {
        return Err(FilenameTimestampError::InvalidDate);
    }

    let timestamp = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_milli_opt(hour, minute, second, millis))
        .ok_or(FilenameTimestampError::InvalidDate)?;

    Ok(FilenameTimestamp { timestamp, has_subsec })
}

pub fn check_filename_datetime(record: &MediaRecord) -> Checked<FilenameTimestamp> {
    let filename = record.filename();
    let name = strip_suffixes(&filename);
    match parse_filename_timestamp(&filename) {
        Ok(ts) => Checked::ok(ts),
        Err(FilenameTimestampError::NoMatch) => {
            Checked::fail(format!("couldn't extract timestamp from the filename {}", name))
        }
        Err(FilenameTimestampError::InvalidDate) => {
            Checked::fail(format!("couldn't parse timestamp from the filename {}", name))
        }
    }
}

/// Tag holding the capture time for this kind of file.
pub fn original_datetime_tag(record: &MediaRecord) -> &'static str {
    // QuickTime CreateDate is supposed to be UTC, but phones store local time in it
    if mime_in(record, &[MIME_MP4, MIME_QUICKTIME]) {
        tags::CREATE_DATE
    } else {
        // jpg, heic, and avi (RIFF metadata maps into it)
        tags::DATE_TIME_ORIGINAL
    }
}

fn is_sane(dt: &NaiveDateTime) -> bool {
    let low = NaiveDate::from_ymd_opt(MIN_SANE_YEAR, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    let high = NaiveDate::from_ymd_opt(MAX_SANE_YEAR, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    match (low, high) {
        (Some(low), Some(high)) => low < *dt && *dt < high,
        _ => false,
    }
}

pub fn check_original_datetime(record: &MediaRecord) -> Checked<NaiveDateTime> {
    let tag = original_datetime_tag(record);
    let Some(dt_orig_s) = record.get(tag) else {
        // reported by check_missing_original_datetime
        return Checked::none();
    };

    // seen in the wild: 0000:00:00 00:00:00, and 24 as the hour
    let dt = match NaiveDateTime::parse_from_str(dt_orig_s, EXIF_DATETIME_FORMAT) {
        Ok(dt) => dt,
        Err(_) => return Checked::fail(format!("couldn't parse {} {}", tag, dt_orig_s)),
    };

    if !is_sane(&dt) {
        return Checked::fail(format!("bad date {} {}", tag, dt_orig_s));
    }

    Checked::ok(dt)
}

/// The capture time is missing: list what else looks like a timestamp and,
/// when the filename has one, offer to set it from there.
pub fn check_missing_original_datetime(
    record: &MediaRecord,
    filename_datetime: Option<&FilenameTimestamp>,
) -> Vec<Diagnostic> {
    let found = collect_present(
        record,
        tags::DT_TAGS.into_iter().chain(tags::DT_EXTRA),
    );

    let mut err = String::from("missing created datetime");
    if !found.is_empty() {
        err.push_str(&format!(", also found some datetime-like tags {}", format_tag_values(&found)));
    }

    match filename_datetime {
        Some(ts) => {
            let fix = Fix::from_filename(record, *ts);
            vec![Diagnostic::with_fix(
                format!("{}. Has filename timestamp {}, use --fix to set it", err, ts.timestamp),
                fix,
            )]
        }
        None => vec![Diagnostic::error(err)],
    }
}
