// src/crawl/walk.rs
// =============================================================================
// Walks the build directory and collects every HTML page.
//
// Rust concepts:
// - walkdir: recursive directory iteration
// - sort(): makes the scan order (and so the report order) deterministic
// =============================================================================

use crate::error::{Result, VerifyError};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

// Finds all .html/.htm files under `build_root`
//
// Entries that cannot be read (dangling symlinks, loops, permission errors)
// are logged and left out; they never stop the walk.
//
// Returns: sorted list of file paths
// Errors: MissingFile if `build_root` is not a directory
pub fn discover_html_files(build_root: &Path) -> Result<Vec<PathBuf>> {
    if !build_root.is_dir() {
        return Err(VerifyError::MissingFile(build_root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(build_root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_html(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}
