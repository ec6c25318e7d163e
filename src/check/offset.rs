// Timezone offset check

use chrono::NaiveDateTime;

use crate::check::{collect_present, format_tag_values, mime_in, Checked, Diagnostic, Fix, OffsetResolver};
use crate::constants::NO_TZ_OFFSET_MIMES;
use crate::db::schema::MediaRecord;
use crate::geo::Coordinate;
use crate::tags;

/// QuickTime (mp4 included) and AVI have no offset tag.
pub fn supports_tz_offset(record: &MediaRecord) -> bool {
    !mime_in(record, &NO_TZ_OFFSET_MIMES)
}

pub fn check_tz_offset(
    record: &MediaRecord,
    coordinate: Option<&Coordinate>,
    original_datetime: Option<NaiveDateTime>,
    resolver: OffsetResolver,
) -> Checked<String> {
    if !supports_tz_offset(record) {
        return Checked::none();
    }

    if let Some(offset) = record.get(tags::OFFSET_TIME_ORIGINAL) {
        return Checked::ok(offset.to_string());
    }

    let mut diagnostics = Vec::new();
    let prefix = format!("missing {}: ", tags::OFFSET_TIME_ORIGINAL);

    let found = collect_present(record, tags::TZ_TAGS.into_iter().chain(tags::TZ_EXTRA));
    if !found.is_empty() {
        let tz_err = format!("{}maybe you can figure it out from {}", prefix, format_tag_values(&found));
        match found.iter().find(|(tag, _)| *tag == tags::OFFSET_TIME) {
            Some((_, value)) => diagnostics.push(Diagnostic::with_fix(
                format!("{}, use --fix to set it from {}", tz_err, tags::OFFSET_TIME),
                Fix::offset_from_other_tag(record, tags::OFFSET_TIME, value),
            )),
            None => diagnostics.push(Diagnostic::error(tz_err)),
        }
    }

    let Some(coordinate) = coordinate else {
        diagnostics.push(Diagnostic::error(format!(
            "{}no GPS coordinates, so can't infer the offset",
            prefix
        )));
        return Checked { diagnostics, value: None };
    };

    // GPSDateTime alone doesn't help: an offset without DateTimeOriginal is meaningless
    let Some(local) = original_datetime else {
        diagnostics.push(Diagnostic::error(format!(
            "{}has GPS coordinates, but no local time, so can't infer the offset",
            prefix
        )));
        return Checked { diagnostics, value: None };
    };

    diagnostics.push(Diagnostic::with_fix(
        format!(
            "{}has GPS coordinates and local datetime {}. Use --fix to set the offset",
            prefix, local
        ),
        Fix::offset_from_gps(record, coordinate.clone(), local, resolver),
    ));

    Checked { diagnostics, value: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::collections::BTreeMap;

    fn record(mime: &str, tags: &[(&str, &str)]) -> MediaRecord {
        let mut metadata: BTreeMap<String, String> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        metadata.insert("MIMEType".to_string(), mime.to_string());
        MediaRecord::new("/p/IMG_1.jpg", "2020-01-01T00:00:00+00:00", metadata)
    }

    fn fixed_resolver(_: &Coordinate, _: NaiveDateTime) -> Result<String> {
        Ok("+03:00".to_string())
    }

    fn noon() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2020:05:01 12:00:00", "%Y:%m:%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_present_offset_is_returned() {
        let r = record("image/jpeg", &[("OffsetTimeOriginal", "+01:00")]);
        let checked = check_tz_offset(&r, None, None, fixed_resolver);
        assert!(checked.diagnostics.is_empty());
        assert_eq!(checked.value.as_deref(), Some("+01:00"));
    }

    #[test]
    fn test_unsupported_containers() {
        for mime in ["video/mp4", "video/quicktime", "video/x-msvideo"] {
            let r = record(mime, &[("OffsetTime", "+01:00")]);
            let coord = Coordinate::new("52.5 N", "13.4 E");
            let checked = check_tz_offset(&r, Some(&coord), Some(noon()), fixed_resolver);
            assert!(checked.diagnostics.is_empty());
            assert!(checked.value.is_none());
        }
    }

    #[test]
    fn test_offset_time_fallback_offers_fix() {
        let r = record("image/jpeg", &[("OffsetTime", "+01:00")]);
        let checked = check_tz_offset(&r, None, None, fixed_resolver);
        assert_eq!(checked.diagnostics.len(), 2);
        let first = &checked.diagnostics[0];
        assert!(first.message.contains("use --fix to set it from OffsetTime"));
        assert!(matches!(first.fix, Some(Fix::OffsetFromOtherTag { .. })));
        assert_eq!(
            checked.diagnostics[1].message,
            "missing OffsetTimeOriginal: no GPS coordinates, so can't infer the offset"
        );
    }

    #[test]
    fn test_other_tz_tags_reported_without_fix() {
        let r = record("image/jpeg", &[("TimeZone", "+09:00")]);
        let checked = check_tz_offset(&r, None, None, fixed_resolver);
        assert_eq!(
            checked.diagnostics[0].message,
            "missing OffsetTimeOriginal: maybe you can figure it out from {TimeZone: \"+09:00\"}"
        );
        assert!(checked.diagnostics[0].fix.is_none());
    }

    #[test]
    fn test_gps_without_local_time() {
        let r = record("image/jpeg", &[]);
        let coord = Coordinate::new("52.5 N", "13.4 E");
        let checked = check_tz_offset(&r, Some(&coord), None, fixed_resolver);
        assert_eq!(checked.diagnostics.len(), 1);
        assert_eq!(
            checked.diagnostics[0].message,
            "missing OffsetTimeOriginal: has GPS coordinates, but no local time, so can't infer the offset"
        );
    }

    #[test]
    fn test_gps_and_local_time_offer_fix() {
        let r = record("image/jpeg", &[]);
        let coord = Coordinate::new("52.5 N", "13.4 E");
        let checked = check_tz_offset(&r, Some(&coord), Some(noon()), fixed_resolver);
        assert_eq!(checked.diagnostics.len(), 1);
        let diag = &checked.diagnostics[0];
        assert!(diag.message.contains("local datetime 2020-05-01 12:00:00"));
        let fix = diag.fix.as_ref().unwrap();
        assert_eq!(fix.describe(), "Set OffsetTimeOriginal to +03:00?");
    }
}
