// GPS coordinate and GPS datetime checks

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::check::{format_tag_values, mime_in, Checked};
use crate::constants::{GPS_DATETIME_FORMAT, NO_GPS_DATETIME_MIMES};
use crate::db::schema::MediaRecord;
use crate::geo::Coordinate;
use crate::tags;

// Composite GPSLatitude/GPSLongitude end with their reference letter
static GPS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+.*(?:N|S|W|E)$").unwrap());

/// Every GPS* tag of the record, for error context.
fn gps_context(record: &MediaRecord) -> String {
    let values: Vec<(&str, &str)> = record
        .metadata
        .iter()
        .filter(|(k, _)| k.starts_with("GPS"))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    format_tag_values(&values)
}

pub fn check_coordinate(record: &MediaRecord) -> Checked<Coordinate> {
    let lat = record.get(tags::GPS_LATITUDE);
    let lon = record.get(tags::GPS_LONGITUDE);

    match (lat, lon) {
        (Some(lat), Some(lon)) => {
            if GPS_RE.is_match(lat) && GPS_RE.is_match(lon) {
                Checked::ok(Coordinate::new(lat, lon))
            } else {
                Checked::fail(format!(
                    "bad gps coordinates, likely missing ref {}",
                    gps_context(record)
                ))
            }
        }
        (None, None) => Checked::fail("missing GPSPosition"),
        _ => Checked::fail(format!("bad gps coordinate tags {}", gps_context(record))),
    }
}

pub fn check_gps_datetime(record: &MediaRecord) -> Checked<DateTime<Utc>> {
    // QuickTime has no GPSDateTime, https://exiftool.org/TagNames/QuickTime.html
    if mime_in(record, &NO_GPS_DATETIME_MIMES) {
        return Checked::none();
    }

    let Some(gps_dt_s) = record.get(tags::GPS_DATE_TIME) else {
        return Checked::fail("missing GPSDateTime");
    };

    match NaiveDateTime::parse_from_str(gps_dt_s, GPS_DATETIME_FORMAT) {
        Ok(dt) => Checked::ok(dt.and_utc()),
        Err(_) => Checked::fail(format!("bad GPS datetime (likely no timezone) {}", gps_dt_s)),
    }
}
