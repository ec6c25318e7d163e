// Known metadata tag names and the groups the checks rely on.
// Non-exhaustive: only tags that the checks or the refresh diff refer to.

pub const DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
pub const DATE_TIME_DIGITIZED: &str = "DateTimeDigitized";
pub const CREATE_DATE: &str = "CreateDate";
pub const OFFSET_TIME_ORIGINAL: &str = "OffsetTimeOriginal";
pub const OFFSET_TIME: &str = "OffsetTime";
pub const GPS_DATE_TIME: &str = "GPSDateTime";
pub const SUB_SEC_DATE_TIME_ORIGINAL: &str = "SubSecDateTimeOriginal";
pub const CONTENT_CREATE_DATE: &str = "ContentCreateDate";
pub const GPS_LATITUDE: &str = "GPSLatitude";
pub const GPS_LONGITUDE: &str = "GPSLongitude";
pub const MIME_TYPE: &str = "MIMEType";
pub const USER_COMMENT: &str = "UserComment";

/// Canonical and near-canonical capture time tags.
pub const DT_TAGS: [&str; 6] = [
    DATE_TIME_ORIGINAL,
    DATE_TIME_DIGITIZED,
    CREATE_DATE,
    SUB_SEC_DATE_TIME_ORIGINAL,
    CONTENT_CREATE_DATE,
    GPS_DATE_TIME,
];

/// Other datetime-like tags, only reported as context.
pub const DT_EXTRA: [&str; 21] = [
    "TimeStamp",
    // photo spheres
    "FirstPhotoDate",
    "LastPhotoDate",
    "DigitalCreationDate",
    "DigitalCreationTime",
    "DigitalCreationDateTime",
    "ModifyDate",
    "SubSecCreateDate",
    "SubSecModifyDate",
    "TimeCreated",
    "MetadataDate",
    "DateCreated",
    "HistoryWhen",
    "DateTimeCreated",
    "DateTime",
    "Date",
    // mp4
    "TrackCreateDate",
    "TrackModifyDate",
    "MediaCreateDate",
    "MediaModifyDate",
    // mov
    "CreationDate",
];

pub const TZ_TAGS: [&str; 1] = [OFFSET_TIME_ORIGINAL];

/// Timezone-like tags that may hint at the offset.
pub const TZ_EXTRA: [&str; 3] = [
    OFFSET_TIME,
    "OffsetTimeDigitized",
    // MakerNotes:TimeZone, rare
    "TimeZone",
];

/// Composite latitude/longitude tags. They already carry the N/S/W/E reference,
/// unlike the raw EXIF ones, and mp4 files have no *Ref tags at all.
pub const GPS_TAGS: [&str; 2] = [GPS_LATITUDE, GPS_LONGITUDE];

/// Tags known to contain a colon for reasons unrelated to capture time.
const COLON_TAGS: [&str; 41] = [
    // synthetic exiftool tags
    "FileModifyDate",
    "FileAccessDate",
    "FileInodeChangeDate",
    // parts of the composite GPSTimeStamp
    "GPSDateStamp",
    "GPSTimeStamp",
    // colour profile
    "ProfileDateTime",
    "YCbCrSubSampling",
    "SpecialMode",
    "About",
    "FocalLength35efl",
    "DerivedFromInstanceID",
    "DerivedFromDocumentID",
    "DeviceMfgDesc",
    "DocumentID",
    "XMPToolkit",
    "Warning",
    "RunTimeSincePowerUp",
    USER_COMMENT,
    "ImageDescription",
    "Comment",
    "Caption-Abstract",
    "Prefs",
    "Profiles",
    "Cameras",
    "ContainerDirectory",
    "HistoryInstanceID",
    "InstanceID",
    "Artist",
    "Copyright",
    "AspectRatio",
    "Lens35efl",
    "CanonImageType",
    "PowerUpTime",
    "HandlerDescription",
    "MajorBrand",
    "MediaDuration",
    "TrackDuration",
    "Duration",
    "PixelAspectRatio",
    "ChromaFormat",
    "AuxiliaryImageType",
];

/// Every tag that should never trigger the unknown-timestamp warning.
pub fn tags_with_colon() -> impl Iterator<Item = &'static str> {
    COLON_TAGS
        .into_iter()
        .chain(DT_TAGS)
        .chain(DT_EXTRA)
        .chain(TZ_TAGS)
        .chain(TZ_EXTRA)
}
