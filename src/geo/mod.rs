// Coordinate -> timezone -> UTC offset resolution

pub mod coordinate;

use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime, Offset, TimeZone};
use chrono::LocalResult;
use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

use crate::error::{MediaCheckError, Result};

pub use coordinate::Coordinate;

// Loading the polygon data is slow, share one finder per process
static FINDER: LazyLock<DefaultFinder> = LazyLock::new(DefaultFinder::new);

/// IANA timezone name for a point.
pub fn timezone_name(lat: f64, lon: f64) -> Result<String> {
    let name = FINDER.get_tz_name(lon, lat);
    if name.is_empty() {
        return Err(MediaCheckError::TimeZone(format!(
            "no timezone found for {}, {}",
            lat, lon
        )));
    }
    Ok(name.to_string())
}

/// UTC offset in effect in `tz` at the local wall-clock time `local`.
///
/// Ambiguous times (DST fall-back) resolve to standard time; times inside a
/// DST gap use the offset in effect just before the gap.
pub fn offset_seconds(tz: Tz, local: NaiveDateTime) -> i32 {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.offset().fix().local_minus_utc(),
        LocalResult::Ambiguous(early, late) => {
            let (a, b) = (
                early.offset().fix().local_minus_utc(),
                late.offset().fix().local_minus_utc(),
            );
            a.min(b)
        }
        LocalResult::None => {
            for hours in 1..=24 {
                if let Some(dt) = tz.from_local_datetime(&(local - Duration::hours(hours))).earliest() {
                    return dt.offset().fix().local_minus_utc();
                }
            }
            tz.offset_from_utc_datetime(&local).fix().local_minus_utc()
        }
    }
}

/// `±HH:MM`
pub fn format_offset(total_seconds: i32) -> String {
    let sign = if total_seconds >= 0 { '+' } else { '-' };
    let abs = total_seconds.unsigned_abs();
    let hours = abs / 3600;
    let minutes = (abs % 3600) / 60;
    format!("{}{:02}:{:02}", sign, hours, minutes)
}

/// Offset string for a photo taken at local time `local` at `coordinate`.
pub fn offset_for_point(coordinate: &Coordinate, local: NaiveDateTime) -> Result<String> {
    let (lat, lon) = coordinate.to_decimal()?;
    let tz_name = timezone_name(lat, lon)?;
    let tz: Tz = tz_name
        .parse()
        .map_err(|e| MediaCheckError::TimeZone(format!("unknown timezone {}: {}", tz_name, e)))?;

    let offset = format_offset(offset_seconds(tz, local));
    log::debug!("{} -> {} -> {} at {}", coordinate, tz_name, offset, local);
    Ok(offset)
}
