// Cache database migrations
// Migrations are forward-only. Never edit or delete a migration after it ships.

use rusqlite::Connection;

use crate::error::{MediaCheckError, Result};

/// All migrations in order. Each migration is a SQL string.
const MIGRATIONS: &[&str] = &[
    // Migration 1: snapshot table, one row per file.
    // exif holds the raw `exiftool -j` object for the file.
    r#"
    CREATE TABLE IF NOT EXISTS data (
        path TEXT PRIMARY KEY,
        mtime TEXT,
        exif TEXT
    );
    "#,
    // Migration 2: virtual columns for ad-hoc querying with sqlite3
    r#"
    ALTER TABLE data ADD COLUMN MIMEType VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.MIMEType')) VIRTUAL;
    ALTER TABLE data ADD COLUMN DateTimeOriginal VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.DateTimeOriginal')) VIRTUAL;
    ALTER TABLE data ADD COLUMN OffsetTimeOriginal VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.OffsetTimeOriginal')) VIRTUAL;
    ALTER TABLE data ADD COLUMN GPSDateTime VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.GPSDateTime')) VIRTUAL;
    ALTER TABLE data ADD COLUMN SubSecDateTimeOriginal VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.SubSecDateTimeOriginal')) VIRTUAL;
    ALTER TABLE data ADD COLUMN ContentCreateDate VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.ContentCreateDate')) VIRTUAL;
    ALTER TABLE data ADD COLUMN DateTimeDigitized VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.DateTimeDigitized')) VIRTUAL;
    ALTER TABLE data ADD COLUMN DateCreated VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.DateCreated')) VIRTUAL;
    ALTER TABLE data ADD COLUMN CreateDate VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.CreateDate')) VIRTUAL;
    ALTER TABLE data ADD COLUMN GPSLatitude VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.GPSLatitude')) VIRTUAL;
    ALTER TABLE data ADD COLUMN GPSLatitudeRef VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.GPSLatitudeRef')) VIRTUAL;
    ALTER TABLE data ADD COLUMN GPSLongitude VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.GPSLongitude')) VIRTUAL;
    ALTER TABLE data ADD COLUMN GPSLongitudeRef VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.GPSLongitudeRef')) VIRTUAL;
    ALTER TABLE data ADD COLUMN GPSAltitude VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.GPSAltitude')) VIRTUAL;
    ALTER TABLE data ADD COLUMN GPSPosition VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.GPSPosition')) VIRTUAL;
    ALTER TABLE data ADD COLUMN Keywords VARCHAR GENERATED ALWAYS AS (json_extract(exif, '$.Keywords')) VIRTUAL;
    "#,
];

/// Get current schema version from database
pub fn get_schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row(
        "PRAGMA user_version",
        [],
        |row| row.get(0)
    )?;
    Ok(version)
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    let target_version = MIGRATIONS.len() as u32;

    if current_version > target_version {
        return Err(MediaCheckError::SchemaTooNew {
            found: current_version,
            supported: target_version,
        });
    }

    if current_version == target_version {
        return Ok(());
    }

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as u32;
        if migration_version <= current_version {
            continue;
        }

        conn.execute_batch(migration)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", migration_version))?;

        log::info!("Applied cache migration {}", migration_version);
    }

    Ok(())
}
