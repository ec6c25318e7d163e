// mediacheck constants

// MIME types as reported by exiftool's MIMEType tag
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_MP4: &str = "video/mp4";
pub const MIME_QUICKTIME: &str = "video/quicktime";
pub const MIME_AVI: &str = "video/x-msvideo";

// QuickTime containers and AVI carry neither GPSDateTime nor a timezone offset tag
pub const NO_GPS_DATETIME_MIMES: [&str; 3] = [MIME_MP4, MIME_QUICKTIME, MIME_AVI];
pub const NO_TZ_OFFSET_MIMES: [&str; 3] = [MIME_MP4, MIME_QUICKTIME, MIME_AVI];

// Timestamp formats
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
pub const EXIF_SUBSEC_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S%.6f";
pub const GPS_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%SZ";
pub const CACHE_MTIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

// Sanity window for original timestamps (both bounds exclusive)
pub const MIN_SANE_YEAR: i32 = 1900;
pub const MAX_SANE_YEAR: i32 = 2100;

// Paths
pub const DEFAULT_DB_FILENAME: &str = "exifs.sqlite";
pub const DEFAULT_BACKUP_FOLDER: &str = "backups";
pub const DEFAULT_AUDIT_LOG: &str = "exiftool.log";
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

// Log column width for paths
pub const PATH_COLUMN_WIDTH: usize = 100;

// Refresh
pub const EXIFTOOL_CHUNK_SIZE: usize = 100;

// Extensions accepted in a collection (lowercase, without dot)
pub const ALLOWED_EXTENSIONS: [&str; 8] = [
    "jpg", "jpeg",
    "mp4",
    "avi",
    "mov",
    "heic", "heif",
    // left behind by exiftool -overwrite_original failures
    "jpg_original",
];

// Extensions skipped silently during discovery
pub const EXCLUDED_EXTENSIONS: [&str; 4] = ["png", "sh", "webp", "thm"];

// File names skipped silently during discovery
pub const EXCLUDED_FILENAMES: [&str; 5] = [".DS_Store", "TODO", "NOTES", ".nomedia", "Thumbs.db"];

// Directory names whose contents are never part of the collection
pub const EXCLUDED_DIRS: [&str; 1] = [".dtrash"];
