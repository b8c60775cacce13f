//! Data processing modules.

pub mod aggregate;
pub mod jnd;
pub mod normalize;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// Re-export key types for convenience
pub use aggregate::{extract_groups, process_folder, save_summary, ExtractionReport, GroupReport};
pub use jnd::{get_min_jnd, summarize_file, Condition, Group, SubjectSummary, CONDITIONS};
pub use normalize::{
    compare_keys, normalize_directory, normalize_file, sort_trial_rows, sort_trial_table,
    NormalizeError, NormalizeReport, SortKey,
};

/// A file left out of a batch, and why.
#[derive(Debug)]
pub struct SkippedFile<E> {
    pub file_name: String,
    pub reason: E,
}

/// True when the file name ends in `.csv` in any case, including a bare `.csv`.
fn has_csv_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            let bytes = name.as_bytes();
            bytes.len() >= 4 && bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".csv")
        })
        .unwrap_or(false)
}

/// Regular files in `dir` whose name ends in `.csv` (any case), sorted by name.
pub fn list_csv_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut csv_files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_csv_suffix(path))
        .collect();

    csv_files.sort();
    Ok(csv_files)
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
