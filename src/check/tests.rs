// End-to-end check_media scenarios against real files on disk

use super::*;
use crate::error::Result;
use crate::geo::Coordinate;
use chrono::NaiveDateTime;
use filetime::FileTime;
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

const MTIME_UNIX: i64 = 1_588_334_400;
const MTIME_CACHED: &str = "2020-05-01T12:00:00+00:00";

fn berlin_resolver(_: &Coordinate, _: NaiveDateTime) -> Result<String> {
    Ok("+02:00".to_string())
}

/// Create `name` under `dir` with a pinned mtime and build its cache record.
fn fresh_record(dir: &Path, name: &str, tags: &[(&str, &str)]) -> MediaRecord {
    let path = dir.join(name);
    std::fs::write(&path, b"not really an image").unwrap();
    filetime::set_file_mtime(&path, FileTime::from_unix_time(MTIME_UNIX, 0)).unwrap();

    let metadata: BTreeMap<String, String> = tags
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    MediaRecord::new(path.to_string_lossy(), MTIME_CACHED, metadata)
}

fn messages(diags: &[Diagnostic]) -> Vec<&str> {
    diags.iter().map(|d| d.message.as_str()).collect()
}

#[test]
fn test_stale_cache_reports_only_freshness() {
    let tmp = TempDir::new().unwrap();
    let mut record = fresh_record(tmp.path(), "IMG_1.jpg", &[("MIMEType", "image/jpeg")]);
    record.mtime = "2019-01-01T00:00:00+00:00".to_string();

    let mut session = CheckSession::with_resolver(berlin_resolver);
    let diags = check_media(&mut session, &record);
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].message,
        "file mtime 2020-05-01T12:00:00+00:00 and db mtime 2019-01-01T00:00:00+00:00 are different! please update the cache"
    );
    assert!(diags[0].fix.is_none());
}

#[test]
fn test_berlin_jpeg_offers_gps_offset() {
    let tmp = TempDir::new().unwrap();
    let record = fresh_record(
        tmp.path(),
        "IMG_20200501_120000.jpg",
        &[
            ("MIMEType", "image/jpeg"),
            ("DateTimeOriginal", "2020:05:01 12:00:00"),
            ("GPSLatitude", "52.5 N"),
            ("GPSLongitude", "13.4 E"),
            ("GPSDateTime", "2020:05:01 10:00:00Z"),
        ],
    );

    let mut session = CheckSession::with_resolver(berlin_resolver);
    let diags = check_media(&mut session, &record);
    assert_eq!(
        messages(&diags),
        vec!["missing OffsetTimeOriginal: has GPS coordinates and local datetime 2020-05-01 12:00:00. Use --fix to set the offset"]
    );
    let fix = diags[0].fix.as_ref().unwrap();
    assert_eq!(fix.offset(), Some(&Ok("+02:00".to_string())));
    assert_eq!(fix.describe(), "Set OffsetTimeOriginal to +02:00?");
}

#[test]
fn test_berlin_jpeg_with_real_timezone_lookup() {
    let tmp = TempDir::new().unwrap();
    let record = fresh_record(
        tmp.path(),
        "IMG_20200501_120000.jpg",
        &[
            ("MIMEType", "image/jpeg"),
            ("DateTimeOriginal", "2020:05:01 12:00:00"),
            ("GPSLatitude", "52.5 N"),
            ("GPSLongitude", "13.4 E"),
            ("GPSDateTime", "2020:05:01 10:00:00Z"),
        ],
    );

    let mut session = CheckSession::new();
    let diags = check_media(&mut session, &record);
    let fix = diags.iter().find_map(|d| d.fix.as_ref()).unwrap();
    assert_eq!(fix.describe(), "Set OffsetTimeOriginal to +02:00?");
}

#[test]
fn test_filename_timestamp_offers_datetime_fix() {
    let tmp = TempDir::new().unwrap();
    let record = fresh_record(tmp.path(), "IMG_20200101_123456.jpg", &[("MIMEType", "image/jpeg")]);

    let mut session = CheckSession::with_resolver(berlin_resolver);
    let diags = check_media(&mut session, &record);
    assert_eq!(
        messages(&diags),
        vec![
            "missing GPSPosition",
            "missing GPSDateTime",
            "missing created datetime. Has filename timestamp 2020-01-01 12:34:56, use --fix to set it",
            "missing OffsetTimeOriginal: no GPS coordinates, so can't infer the offset",
        ]
    );

    let fixes: Vec<&Fix> = diags.iter().filter_map(|d| d.fix.as_ref()).collect();
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].target_tag(), "DateTimeOriginal");
    assert_eq!(
        fixes[0].describe(),
        "Set DateTimeOriginal from the filename? IMG_20200101_123456.jpg. Timestamp will be 2020-01-01 12:34:56"
    );
}

#[test]
fn test_mp4_skips_gps_datetime_and_offset() {
    let tmp = TempDir::new().unwrap();
    let record = fresh_record(
        tmp.path(),
        "VID_20200101_123456.mp4",
        &[
            ("MIMEType", "video/mp4"),
            ("CreateDate", "2020:01:01 12:34:56"),
            ("GPSLatitude", "52.5 N"),
            ("GPSLongitude", "13.4 E"),
        ],
    );

    let mut session = CheckSession::with_resolver(berlin_resolver);
    let diags = check_media(&mut session, &record);
    assert!(diags.is_empty(), "unexpected diagnostics: {:?}", messages(&diags));
}

#[test]
fn test_diagnostics_are_deterministic() {
    let tmp = TempDir::new().unwrap();
    let record = fresh_record(
        tmp.path(),
        "DSC01234.JPG",
        &[
            ("MIMEType", "image/jpeg"),
            ("GPSLatitude", "52.5"),
            ("GPSLongitude", "13.4"),
            ("ModifyDate", "2019:01:01 10:00:00"),
            ("OffsetTime", "+01:00"),
        ],
    );

    let mut session = CheckSession::with_resolver(berlin_resolver);
    let first: Vec<String> = check_media(&mut session, &record).into_iter().map(|d| d.message).collect();
    let second: Vec<String> = check_media(&mut session, &record).into_iter().map(|d| d.message).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
    assert!(first[0].starts_with("bad gps coordinates, likely missing ref"));
    assert_eq!(first[1], "missing GPSDateTime");
    assert_eq!(first[2], "couldn't extract timestamp from the filename DSC01234");
    assert!(first[3].starts_with("missing created datetime, also found some datetime-like tags"));
    assert!(first[4].ends_with("use --fix to set it from OffsetTime"));
    assert_eq!(first[5], "missing OffsetTimeOriginal: no GPS coordinates, so can't infer the offset");
}

#[test]
fn test_unknown_colon_tags_reported_once_per_session() {
    let tmp = TempDir::new().unwrap();
    let a = fresh_record(tmp.path(), "a.jpg", &[("MIMEType", "image/jpeg"), ("WeirdStamp", "12:34")]);
    let b = fresh_record(tmp.path(), "b.jpg", &[("MIMEType", "image/jpeg"), ("WeirdStamp", "56:78")]);

    let mut session = CheckSession::with_resolver(berlin_resolver);
    assert_eq!(session.detect_datetimeish_tags(&a), vec!["WeirdStamp".to_string()]);
    assert!(session.detect_datetimeish_tags(&b).is_empty());

    // known tags never count, whatever their value
    let c = fresh_record(tmp.path(), "c.jpg", &[("ModifyDate", "2019:01:01 10:00:00")]);
    assert!(session.detect_datetimeish_tags(&c).is_empty());

    // a fresh session starts over
    let mut other = CheckSession::with_resolver(berlin_resolver);
    assert_eq!(other.detect_datetimeish_tags(&b), vec!["WeirdStamp".to_string()]);
}

#[test]
fn test_unreadable_mtime_reports_only_freshness() {
    let tmp = TempDir::new().unwrap();
    let record = fresh_record(tmp.path(), "IMG_20200101_123456.jpg", &[("MIMEType", "image/jpeg")]);
    std::fs::remove_file(&record.path).unwrap();

    let stale = check_freshness(&record).unwrap();
    assert!(stale.fix.is_none());
    assert!(stale
        .message
        .starts_with("couldn't read file mtime ("));
    assert!(stale
        .message
        .ends_with("), db mtime 2020-05-01T12:00:00+00:00. please update the cache"));

    let mut session = CheckSession::with_resolver(berlin_resolver);
    let diags = check_media(&mut session, &record);
    assert_eq!(messages(&diags), vec![stale.message.as_str()]);
}
