// ExifTool wrapper: bulk JSON extraction for cache refresh and
// single-tag writes with backup + audit log for fixes

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Local;

use crate::constants::BACKUP_TIMESTAMP_FORMAT;
use crate::error::{MediaCheckError, Result};
use crate::metadata::TagWriter;
use crate::tags;

/// Run `exiftool -j` over a group of files. Returns one JSON object per
/// file, in the order exiftool printed them.
pub fn extract_json(exiftool: &Path, paths: &[PathBuf]) -> Result<Vec<serde_json::Value>> {
    let output = Command::new(exiftool)
        .arg("-j")
        .args(paths)
        .output()
        .map_err(|e| MediaCheckError::ExifTool(format!("Failed to run exiftool: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(MediaCheckError::ExifTool(format!(
            "exiftool exited with {}: {}",
            output.status, stderr
        )));
    }

    let results: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout)
        .map_err(|e| MediaCheckError::ExifTool(format!("Failed to parse exiftool JSON: {}", e)))?;

    if results.len() != paths.len() {
        return Err(MediaCheckError::ExifTool(format!(
            "expected {} results from exiftool, got {}",
            paths.len(),
            results.len()
        )));
    }

    Ok(results)
}

/// Writes tags through exiftool. Every write backs the file up into
/// `backup_dir` and records each command in `audit_log`.
#[derive(Debug, Clone)]
pub struct ExifToolWriter {
    pub exiftool: PathBuf,
    pub backup_dir: PathBuf,
    pub audit_log: PathBuf,
}

impl ExifToolWriter {
    pub fn new(backup_dir: PathBuf, audit_log: PathBuf) -> Self {
        Self {
            exiftool: crate::tools::exiftool_path(),
            backup_dir,
            audit_log,
        }
    }

    fn backup(&self, path: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.backup_dir)?;
        let bak_path = self.backup_dir.join(backup_name(path, &Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string()));
        log::debug!("backing up {} to {}", path.display(), bak_path.display());
        fs::copy(path, &bak_path)?;
        Ok(bak_path)
    }

    fn run_logged(&self, args: &[String]) -> Result<()> {
        log::debug!("running {:?} {:?}", self.exiftool, args);
        {
            let mut log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.audit_log)?;
            writeln!(log_file, "running {:?} {:?}", self.exiftool, args)?;
        }

        let status = Command::new(&self.exiftool)
            .args(args)
            .status()
            .map_err(|e| MediaCheckError::ExifTool(format!("Failed to run exiftool: {}", e)))?;

        if !status.success() {
            return Err(MediaCheckError::ExifTool(format!(
                "exiftool exited with {} for {:?}",
                status, args
            )));
        }
        Ok(())
    }
}

impl TagWriter for ExifToolWriter {
    fn set_tag(&self, path: &Path, tag: &str, value: &str, comment: &str) -> Result<()> {
        let path_str = path.to_string_lossy().to_string();
        // UserComment can't be appended to anything but JPEG
        if !path_str.to_lowercase().contains(".jpg") {
            return Err(MediaCheckError::UnsupportedFix {
                path: path_str,
                reason: format!("{} can only be written to .jpg files", tags::USER_COMMENT),
            });
        }

        self.backup(path)?;

        // Two commands: a missing UserComment makes exiftool warn, and warnings
        // must stay fatal for the tag write itself.
        let set_cmd = vec![
            "-q".to_string(),
            "-overwrite_original".to_string(),
            format!("-{}={}", tag, value),
            path_str.clone(),
        ];
        let comment_cmd = vec![
            "-q".to_string(),
            "-overwrite_original".to_string(),
            "-m".to_string(),
            format!("-{0}<${0}\n{1}", tags::USER_COMMENT, comment),
            path_str,
        ];

        self.run_logged(&set_cmd)?;
        self.run_logged(&comment_cmd)?;
        Ok(())
    }
}

/// `<filename>.bak.<timestamp>`
pub fn backup_name(path: &Path, timestamp: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("{}.bak.{}", name, timestamp)
}
