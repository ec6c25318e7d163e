// Cache refresh: discover files, re-extract the changed ones with exiftool,
// show what changed and write the new snapshot

pub mod diff;
pub mod discover;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde_json::{Map, Value};

use crate::constants::{EXIFTOOL_CHUNK_SIZE, PATH_COLUMN_WIDTH};
use crate::db::{self, get_media_mtime, schema};
use crate::error::{MediaCheckError, Result};
use crate::metadata::exiftool::extract_json;
use crate::reconcile::prompt::confirm;

pub use diff::{diff_exif, TagChange};
pub use discover::discover_media_files;

/// One row to insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub path: String,
    pub mtime: String,
    pub exif: String,
}

#[derive(Debug, Default)]
pub struct RefreshPlan {
    pub inserts: Vec<CacheEntry>,
    pub updates: Vec<CacheEntry>,
    /// Per updated path, the tags that changed
    pub changes: Vec<(String, Vec<TagChange>)>,
}

impl RefreshPlan {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }
}

/// Files whose live mtime differs from the cached one (or that aren't cached).
pub fn stale_files(files: &[PathBuf], cached: &HashMap<String, String>) -> Result<Vec<(PathBuf, String)>> {
    let mut stale = Vec::new();
    for path in files {
        let mtime = get_media_mtime(path)?;
        let key = path.to_string_lossy();
        if cached.get(&*key) != Some(&mtime) {
            stale.push((path.clone(), mtime));
        }
    }
    Ok(stale)
}

/// Extract metadata for the stale files, chunk by chunk, and sort the
/// results into inserts and updates. Updates are diffed against the cache.
pub fn plan_refresh<F>(conn: &Connection, stale: &[(PathBuf, String)], mut extract: F) -> Result<RefreshPlan>
where
    F: FnMut(&[PathBuf]) -> Result<Vec<Value>>,
{
    let mut plan = RefreshPlan::default();

    for chunk in stale.chunks(EXIFTOOL_CHUNK_SIZE) {
        let paths: Vec<PathBuf> = chunk.iter().map(|(p, _)| p.clone()).collect();
        let results = extract(&paths)?;
        if results.len() != chunk.len() {
            return Err(MediaCheckError::ExifTool(format!(
                "expected {} results, got {}",
                chunk.len(),
                results.len()
            )));
        }

        for ((path, mtime), exif) in chunk.iter().zip(results) {
            let path_s = path.to_string_lossy().to_string();
            let entry = CacheEntry {
                path: path_s.clone(),
                mtime: mtime.clone(),
                exif: serde_json::to_string(&exif)?,
            };

            match schema::get_record_exif(conn, &path_s)? {
                None => plan.inserts.push(entry),
                Some(old_s) => {
                    let old: Map<String, Value> = serde_json::from_str(&old_s)?;
                    let new = match &exif {
                        Value::Object(m) => m.clone(),
                        _ => {
                            return Err(MediaCheckError::ExifTool(format!(
                                "expected a JSON object for {}",
                                path_s
                            )))
                        }
                    };
                    let changes = diff_exif(&path_s, &old, &new)?;
                    plan.changes.push((path_s, changes));
                    plan.updates.push(entry);
                }
            }
        }
    }

    Ok(plan)
}

/// Write the plan in a single transaction.
pub fn apply_plan(conn: &mut Connection, plan: &RefreshPlan) -> Result<()> {
    let tx = conn.transaction()?;
    for entry in &plan.inserts {
        schema::insert_record(&tx, &entry.path, &entry.mtime, &entry.exif)?;
    }
    for entry in &plan.updates {
        schema::update_record(&tx, &entry.path, &entry.mtime, &entry.exif)?;
    }
    tx.commit()?;
    Ok(())
}

fn log_changes(plan: &RefreshPlan) {
    for (path, changes) in &plan.changes {
        for change in changes {
            log::info!(
                "{:<width$} : {} {} -> {}",
                path,
                change.tag,
                change.before_str(),
                change.after_str(),
                width = PATH_COLUMN_WIDTH
            );
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub discovered: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Bring the cache at `db_path` up to date with the files under `root`.
/// Entry point of the `refresh` command.
pub fn refresh(db_path: &Path, root: &Path, assume_yes: bool) -> Result<RefreshSummary> {
    let mut conn = db::open_db(db_path)?;
    let exiftool = crate::tools::exiftool_path();

    let files = discover_media_files(root)?;
    log::info!("discovered {} files in {}", files.len(), root.display());

    let cached = schema::get_cached_mtimes(&conn)?;
    let stale = stale_files(&files, &cached)?;
    let mut summary = RefreshSummary {
        discovered: files.len(),
        ..Default::default()
    };
    if stale.is_empty() {
        log::info!("no changes!");
        return Ok(summary);
    }

    let plan = plan_refresh(&conn, &stale, |paths| extract_json(&exiftool, paths))?;
    log::info!("{} inserts, {} updates", plan.inserts.len(), plan.updates.len());
    log_changes(&plan);

    if !assume_yes && !confirm("happy to proceed?")? {
        return Err(MediaCheckError::Aborted);
    }

    apply_plan(&mut conn, &plan)?;
    summary.inserted = plan.inserts.len();
    summary.updated = plan.updates.len();
    Ok(summary)
}
