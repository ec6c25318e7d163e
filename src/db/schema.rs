// Cache record type and query helpers

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::metadata::value_to_string;
use crate::tags;

// ----- MediaRecord -----

/// One cached snapshot of a single file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub path: String,
    /// Modification time at the last refresh, `YYYY-MM-DDTHH:MM:SS+00:00`.
    pub mtime: String,
    pub metadata: BTreeMap<String, String>,
}

impl MediaRecord {
    pub fn new(path: impl Into<String>, mtime: impl Into<String>, metadata: BTreeMap<String, String>) -> Self {
        Self {
            path: path.into(),
            mtime: mtime.into(),
            metadata,
        }
    }

    /// Build a record from the exiftool JSON object stored in the cache.
    /// Null and empty values are dropped, non-string values are stringified.
    pub fn from_exif_json(path: &str, mtime: &str, exif: &str) -> Result<Self> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(exif)?;
        let metadata = raw
            .iter()
            .filter_map(|(k, v)| value_to_string(v).map(|s| (k.clone(), s)))
            .collect();
        Ok(Self::new(path, mtime, metadata))
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.metadata.get(tag).map(|s| s.as_str())
    }

    pub fn mime(&self) -> Option<&str> {
        self.get(tags::MIME_TYPE)
    }

    pub fn file_path(&self) -> &Path {
        Path::new(&self.path)
    }

    pub fn filename(&self) -> String {
        self.file_path()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn parent_dir(&self) -> PathBuf {
        self.file_path()
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default()
    }
}

// ----- Queries -----

/// All records, in the table's natural order.
pub fn list_records(conn: &Connection) -> Result<Vec<MediaRecord>> {
    let mut stmt = conn.prepare("SELECT path, mtime, exif FROM data")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (path, mtime, exif) = row?;
        let record = MediaRecord::from_exif_json(
            &path,
            mtime.as_deref().unwrap_or_default(),
            exif.as_deref().unwrap_or("{}"),
        )?;
        records.push(record);
    }
    Ok(records)
}

/// path -> cached mtime, for deciding what a refresh has to re-extract
pub fn get_cached_mtimes(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT path, mtime FROM data")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
    })?;

    let mut mtimes = HashMap::new();
    for row in rows {
        let (path, mtime) = row?;
        mtimes.insert(path, mtime.unwrap_or_default());
    }
    Ok(mtimes)
}

pub fn get_record_exif(conn: &Connection, path: &str) -> Result<Option<String>> {
    let result = conn.query_row(
        "SELECT exif FROM data WHERE path = ?1",
        params![path],
        |row| row.get(0),
    ).optional()?;
    Ok(result)
}

pub fn insert_record(conn: &Connection, path: &str, mtime: &str, exif: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO data (path, mtime, exif) VALUES (?1, ?2, ?3)",
        params![path, mtime, exif],
    )?;
    Ok(())
}

pub fn update_record(conn: &Connection, path: &str, mtime: &str, exif: &str) -> Result<()> {
    conn.execute(
        "UPDATE data SET mtime = ?2, exif = ?3 WHERE path = ?1",
        params![path, mtime, exif],
    )?;
    Ok(())
}
