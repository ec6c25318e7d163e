// Metadata cache database

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags};

use crate::constants::{CACHE_MTIME_FORMAT, DEFAULT_DB_FILENAME};
use crate::error::{MediaCheckError, Result};

/// Open or create a cache database at the given path
pub fn open_db(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Open an existing cache for checking. The file is opened immutable, so
/// nothing a check does can touch the snapshot.
pub fn open_db_readonly(db_path: &Path) -> Result<Connection> {
    if !db_path.exists() {
        return Err(MediaCheckError::CacheNotFound(db_path.display().to_string()));
    }

    let uri = format!("file:{}?immutable=1", db_path.display());
    let conn = Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    Ok(conn)
}

/// Default cache location: exifs.sqlite in the working directory
pub fn default_db_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DEFAULT_DB_FILENAME)
}

/// Format a modification time the way the cache stores it (UTC, whole seconds)
pub fn format_mtime(mtime: std::time::SystemTime) -> String {
    let dt: DateTime<Utc> = mtime.into();
    dt.format(CACHE_MTIME_FORMAT).to_string()
}

/// Live modification time of a file, comparable with `MediaRecord::mtime`
pub fn get_media_mtime(path: &Path) -> Result<String> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(format_mtime(modified))
}
