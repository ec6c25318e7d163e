// File discovery for cache refresh

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::constants::{ALLOWED_EXTENSIONS, EXCLUDED_DIRS, EXCLUDED_EXTENSIONS, EXCLUDED_FILENAMES};
use crate::error::{MediaCheckError, Result};

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Files that never belong in the cache: screenshots, scripts, thumbnails,
/// OS droppings, and anything in the trash.
pub fn is_excluded(path: &Path) -> bool {
    if let Some(ext) = lowercase_extension(path) {
        if EXCLUDED_EXTENSIONS.contains(&ext.as_str()) {
            return true;
        }
    }

    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if EXCLUDED_FILENAMES.contains(&name) {
            return true;
        }
    }

    path.components()
        .any(|c| EXCLUDED_DIRS.iter().any(|d| c.as_os_str() == *d))
}

/// Check if a file has one of the supported media extensions
pub fn is_supported(path: &Path) -> bool {
    lowercase_extension(path).map_or(false, |ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Discover all media files under `root`, sorted by path.
///
/// Symlinks are not followed. A file that is neither excluded nor a
/// supported media file is an error: the collection should not contain it.
pub fn discover_media_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        let file_type = entry.file_type();
        if file_type.is_dir() || file_type.is_symlink() {
            continue;
        }

        let path = entry.path();
        if is_excluded(path) {
            continue;
        }
        if !is_supported(path) {
            return Err(MediaCheckError::UnsupportedFile(path.display().to_string()));
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}
