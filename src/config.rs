// Inclusion policy and TOML configuration for the check run

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::constants::{DEFAULT_AUDIT_LOG, DEFAULT_BACKUP_FOLDER};
use crate::db::schema::MediaRecord;
use crate::error::{MediaCheckError, Result};

/// Decides which records get checked and which diagnostics are noise.
pub trait InclusionPolicy {
    fn include_filename(&self, _path: &str) -> bool {
        true
    }

    fn ignore_error(&self, _record: &MediaRecord, _error: &str) -> bool {
        false
    }
}

/// Checks everything, ignores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct IncludeAll;

impl InclusionPolicy for IncludeAll {}

// ----- On-disk format -----

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PolicyFile {
    include: IncludeSection,
    ignore: Vec<IgnoreEntry>,
    fixes: FixesSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct IncludeSection {
    paths: Vec<String>,
    exclude: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IgnoreEntry {
    error: String,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FixesSection {
    backup_dir: Option<PathBuf>,
    audit_log: Option<PathBuf>,
}

// ----- Compiled policy -----

#[derive(Debug)]
struct IgnoreRule {
    error: Regex,
    path: Option<Regex>,
}

/// Regex based policy loaded from a TOML file.
#[derive(Debug, Default)]
pub struct PolicyConfig {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    ignore: Vec<IgnoreRule>,
    backup_dir: Option<PathBuf>,
    audit_log: Option<PathBuf>,
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| Ok(Regex::new(p)?)).collect()
}

impl PolicyConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MediaCheckError::Config(format!("can't read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)?;
        log::debug!("loaded policy from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let file: PolicyFile = toml::from_str(text)?;

        let ignore = file
            .ignore
            .iter()
            .map(|entry| {
                Ok(IgnoreRule {
                    error: Regex::new(&entry.error)?,
                    path: entry.path.as_deref().map(Regex::new).transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            include: compile_all(&file.include.paths)?,
            exclude: compile_all(&file.include.exclude)?,
            ignore,
            backup_dir: file.fixes.backup_dir,
            audit_log: file.fixes.audit_log,
        })
    }

    /// Where ExifToolWriter keeps backups. Relative paths hang off `db_dir`.
    pub fn backup_dir(&self, db_dir: &Path) -> PathBuf {
        resolve(db_dir, self.backup_dir.as_deref(), DEFAULT_BACKUP_FOLDER)
    }

    /// Where ExifToolWriter appends the commands it runs.
    pub fn audit_log(&self, db_dir: &Path) -> PathBuf {
        resolve(db_dir, self.audit_log.as_deref(), DEFAULT_AUDIT_LOG)
    }
}

fn resolve(base: &Path, configured: Option<&Path>, default: &str) -> PathBuf {
    match configured {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => base.join(p),
        None => base.join(default),
    }
}

impl InclusionPolicy for PolicyConfig {
    fn include_filename(&self, path: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|re| re.is_match(path)) {
            return false;
        }
        !self.exclude.iter().any(|re| re.is_match(path))
    }

    fn ignore_error(&self, record: &MediaRecord, error: &str) -> bool {
        self.ignore.iter().any(|rule| {
            rule.error.is_match(error)
                && rule.path.as_ref().map_or(true, |re| re.is_match(&record.path))
        })
    }
}
