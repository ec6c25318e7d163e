// mediacheck error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaCheckError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Cache database not found: {0}")]
    CacheNotFound(String),

    #[error("Cache schema version {found} is newer than this build supports (max {supported})")]
    SchemaTooNew { found: u32, supported: u32 },

    #[error("ExifTool error: {0}")]
    ExifTool(String),

    /// A fix was applied to a file type it was never meant for.
    #[error("Refusing to apply fix to {path}: {reason}")]
    UnsupportedFix { path: String, reason: String },

    #[error("Unsupported file in collection: {0}")]
    UnsupportedFile(String),

    #[error("Unexpected change of tag {tag} in {path}: {before} -> {after}")]
    UnexpectedChange {
        path: String,
        tag: String,
        before: String,
        after: String,
    },

    #[error("Bad coordinate: {0}")]
    Coordinate(String),

    #[error("Timezone error: {0}")]
    TimeZone(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Aborted by user")]
    Aborted,
}

pub type Result<T> = std::result::Result<T, MediaCheckError>;
