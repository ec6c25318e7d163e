// Runs the checks over the whole cache, tallies errors per directory and
// drives fix application

pub mod prompt;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::check::{check_media, CheckSession, Fix};
use crate::config::{InclusionPolicy, PolicyConfig};
use crate::constants::PATH_COLUMN_WIDTH;
use crate::db::{self, schema::MediaRecord};
use crate::error::Result;
use crate::metadata::{ExifToolWriter, TagWriter};

pub use prompt::{AutoApprove, DialoguerPrompt, FixChoice, FixPrompt};

#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Only records whose path contains a match are checked
    pub filter: Option<Regex>,
    pub apply_fixes: bool,
    pub dir_summary: bool,
}

/// A fix waiting for confirmation, with the diagnostic that proposed it.
#[derive(Debug)]
pub struct PendingFix {
    pub path: String,
    pub message: String,
    pub fix: Fix,
}

#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub checked: usize,
    /// Excluded by the policy or the filter
    pub skipped: usize,
    /// Cached but gone from disk
    pub skipped_missing: usize,
    pub diagnostics: usize,
    pub per_directory: BTreeMap<PathBuf, usize>,
    pub pending_fixes: usize,
    pub applied: usize,
    pub aborted: bool,
}

impl ReconcileReport {
    /// Directories with at least one error, fewest first.
    pub fn directory_summary(&self) -> Vec<(&Path, usize)> {
        let mut rows: Vec<(&Path, usize)> = self
            .per_directory
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(dir, count)| (dir.as_path(), *count))
            .collect();
        rows.sort_by_key(|(_, count)| *count);
        rows
    }
}

fn log_error(path: &str, message: &str) {
    log::error!("{:<width$} : {}", path, message, width = PATH_COLUMN_WIDTH);
}

/// Check every record and, when asked, offer the collected fixes.
///
/// At most one fix is kept per record: the first one reported. Applying one
/// fix can change what the later checks would conclude.
pub fn reconcile<I>(
    records: I,
    session: &mut CheckSession,
    policy: &dyn InclusionPolicy,
    options: &CheckOptions,
    writer: &dyn TagWriter,
    prompt: &mut dyn FixPrompt,
) -> Result<ReconcileReport>
where
    I: IntoIterator<Item = MediaRecord>,
{
    let mut report = ReconcileReport::default();
    let mut pending: Vec<PendingFix> = Vec::new();

    for record in records {
        if !policy.include_filename(&record.path) {
            report.skipped += 1;
            continue;
        }
        if let Some(re) = &options.filter {
            if !re.is_match(&record.path) {
                report.skipped += 1;
                continue;
            }
        }
        if !record.file_path().exists() {
            log::debug!("{} doesn't exist anymore.. ignoring", record.path);
            report.skipped_missing += 1;
            continue;
        }

        report.checked += 1;
        let dir = record.parent_dir();
        report.per_directory.entry(dir.clone()).or_insert(0);

        let mut record_fix: Option<PendingFix> = None;
        for diagnostic in check_media(session, &record) {
            if policy.ignore_error(&record, &diagnostic.message) {
                continue;
            }

            *report.per_directory.entry(dir.clone()).or_insert(0) += 1;
            report.diagnostics += 1;
            log_error(&record.path, &diagnostic.message);

            if record_fix.is_none() {
                if let Some(fix) = diagnostic.fix {
                    record_fix = Some(PendingFix {
                        path: record.path.clone(),
                        message: diagnostic.message,
                        fix,
                    });
                }
            }
        }

        pending.extend(record_fix);
    }

    report.pending_fixes = pending.len();

    if options.dir_summary {
        log::info!("summary of errors per directory");
        for (dir, count) in report.directory_summary() {
            log::info!("{:<width$} : {}", dir.display().to_string(), count, width = PATH_COLUMN_WIDTH);
        }
    }

    if options.apply_fixes && !pending.is_empty() {
        let (applied, aborted) = apply_fixes(&pending, writer, prompt)?;
        report.applied = applied;
        report.aborted = aborted;
    }

    log::info!(
        "checked {} files: {} errors, {} fixes suggested, {} applied",
        report.checked,
        report.diagnostics,
        report.pending_fixes,
        report.applied
    );

    Ok(report)
}

/// Preview every pending fix, then offer them one by one.
/// Returns the number applied and whether the user aborted.
fn apply_fixes(
    pending: &[PendingFix],
    writer: &dyn TagWriter,
    prompt: &mut dyn FixPrompt,
) -> Result<(usize, bool)> {
    log::info!("suggested fixes:");
    for p in pending {
        log::info!("{:<width$} : {}", p.path, p.message, width = PATH_COLUMN_WIDTH);
        eprintln!("       suggested fix: {}", p.fix.describe());
    }

    log::info!("offering to fix");
    let mut auto_apply = false;
    let mut applied = 0;
    for p in pending {
        let description = p.fix.describe();
        log::info!("{:<width$} : {}", p.path, p.message, width = PATH_COLUMN_WIDTH);
        log::info!("   suggested fix: {}", description);

        if !auto_apply {
            match prompt.ask(&p.path, &description)? {
                FixChoice::Abort => {
                    log::info!("aborted, {} fixes applied", applied);
                    return Ok((applied, true));
                }
                FixChoice::Skip => continue,
                FixChoice::ApplyAll => auto_apply = true,
                FixChoice::Apply => {}
            }
        }

        // a failed write leaves the file in an unknown state, stop here
        p.fix.apply(writer)?;
        applied += 1;
    }

    Ok((applied, false))
}

/// Check the cache at `db_path`. Entry point of the `check` command.
pub fn check_all(
    db_path: &Path,
    filter_pattern: Option<&str>,
    apply_fixes: bool,
    dir_summary: bool,
    assume_yes: bool,
    policy: &PolicyConfig,
) -> Result<ReconcileReport> {
    let filter = filter_pattern.map(Regex::new).transpose()?;

    let conn = db::open_db_readonly(db_path)?;
    let records = db::schema::list_records(&conn)?;
    log::debug!("loaded {} records from {}", records.len(), db_path.display());

    let db_dir = match db_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let writer = ExifToolWriter::new(policy.backup_dir(&db_dir), policy.audit_log(&db_dir));

    let options = CheckOptions {
        filter,
        apply_fixes,
        dir_summary,
    };
    let mut session = CheckSession::new();

    if assume_yes {
        reconcile(records, &mut session, policy, &options, &writer, &mut AutoApprove)
    } else {
        reconcile(records, &mut session, policy, &options, &writer, &mut DialoguerPrompt)
    }
}
