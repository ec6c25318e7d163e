// External tool resolver for exiftool
//
// Resolution order:
// 1) Environment variable override (MEDIACHECK_EXIFTOOL_PATH)
// 2) Next to the executable, or in its bin/ subdirectory
// 3) PATH fallback

use std::env;
use std::path::PathBuf;

pub const EXIFTOOL_ENV: &str = "MEDIACHECK_EXIFTOOL_PATH";

/// Get the directory containing the current executable
fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}

fn resolve_tool(env_key: &str, default_name: &str) -> PathBuf {
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
    }

    let mut filename = default_name.to_string();
    if cfg!(windows) && !filename.to_lowercase().ends_with(".exe") {
        filename.push_str(".exe");
    }

    if let Some(dir) = exe_dir() {
        let candidate = dir.join(&filename);
        if candidate.exists() {
            return candidate;
        }

        let bin_candidate = dir.join("bin").join(&filename);
        if bin_candidate.exists() {
            return bin_candidate;
        }
    }

    PathBuf::from(default_name)
}

/// Get path to exiftool binary
pub fn exiftool_path() -> PathBuf {
    resolve_tool(EXIFTOOL_ENV, "exiftool")
}

/// Check if exiftool can be run at the resolved path
pub fn is_exiftool_available() -> bool {
    let path = exiftool_path();
    if path.exists() {
        return true;
    }

    std::process::Command::new(&path)
        .arg("-ver")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
