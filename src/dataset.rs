//! Input discovery and per-run output directories

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::config::Dataset;
use crate::Result;

/// Timestamp format of run directories, e.g. `March 04 2024 17-05-09`
pub const RUN_DIR_FORMAT: &str = "%B %d %Y %H-%M-%S";

/// Files in `dir` (not recursive) whose extension is exactly `extension`, sorted by path
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == extension);
        if matches {
            files.push(path);
        }
    }

    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "Listed input files");
    Ok(files)
}

/// `<output_root>/<dataset>/<timestamp>` for a run started at `started`
pub fn output_dir_at(output_root: &Path, dataset: Dataset, started: DateTime<Local>) -> PathBuf {
    output_root
        .join(dataset.dir_name())
        .join(started.format(RUN_DIR_FORMAT).to_string())
}

/// Create a fresh output directory for a run starting now
pub fn create_output_dir(output_root: &Path, dataset: Dataset) -> Result<PathBuf> {
    let dir = output_dir_at(output_root, dataset, Local::now());
    std::fs::create_dir_all(&dir)?;
    info!(dir = %dir.display(), "Created output directory");
    Ok(dir)
}
