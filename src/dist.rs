// ABOUTME: Local build output helpers: dist directory checks, version file, file listing.
// ABOUTME: Produces the ordered file list that the upload orchestrator works from.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the version marker written into the dist directory.
pub const VERSION_FILENAME: &str = "version.txt";

/// Fail with an operator-facing error unless `dist_dir` is a directory.
pub async fn ensure_dist_dir(dist_dir: &Path) -> Result<()> {
    match tokio::fs::metadata(dist_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(Error::DistMissing(dist_dir.to_path_buf())),
    }
}

/// Write `version.txt` holding the stage version. Returns its path.
pub async fn write_version_file(dist_dir: &Path, version: &str) -> Result<PathBuf> {
    let path = dist_dir.join(VERSION_FILENAME);
    tokio::fs::write(&path, version).await?;
    Ok(path)
}

/// List every file under `root`, descending into subdirectories.
///
/// The result is sorted so file ordinals are stable between runs.
pub async fn find_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut dirs = vec![root.to_path_buf()];

    while let Some(dir) = dirs.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                dirs.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// True when the only file found is the version marker.
pub fn only_version_file(files: &[PathBuf]) -> bool {
    matches!(files, [only] if only.file_name().is_some_and(|n| n == VERSION_FILENAME))
}
