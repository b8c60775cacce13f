//! Trial-log normalization: canonical row order per subject file.
//!
//! Rows are ordered by `Standard_Hz` ascending, then `Condition_ISI`
//! descending, then `Comparison_Hz` descending. Within one standard/ISI block
//! the last row is therefore the comparison tone closest to the standard,
//! which is what the JND selector relies on.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use thiserror::Error;

use super::{file_name_of, list_csv_files, SkippedFile};
use crate::core::loaders::{
    load_trial_table, LoaderError, TrialRow, TrialTable, COMPARISON_HZ, CONDITION_ISI,
    STANDARD_HZ,
};
use crate::core::writers::{write_trial_table, WriteError};

/// Columns that must be present for a file to be normalized.
pub const SORT_COLUMNS: [&str; 3] = [STANDARD_HZ, CONDITION_ISI, COMPARISON_HZ];

/// Errors that can occur during normalization.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Source directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Load(#[from] LoaderError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl NormalizeError {
    /// True when the file was rejected for lacking a sort column.
    pub fn is_missing_columns(&self) -> bool {
        matches!(self, NormalizeError::Load(LoaderError::MissingColumns { .. }))
    }
}

/// Composite ordering key of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortKey {
    pub standard_hz: f64,
    pub condition_isi: f64,
    pub comparison_hz: f64,
}

impl SortKey {
    pub fn of(row: &TrialRow) -> Self {
        Self {
            standard_hz: row.standard_hz,
            condition_isi: row.condition_isi,
            comparison_hz: row.comparison_hz,
        }
    }
}

/// Compare one key component. Empty (NaN) cells go last in either direction.
fn cmp_component(a: f64, b: f64, descending: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

/// Canonical order: `Standard_Hz` asc, `Condition_ISI` desc, `Comparison_Hz` desc.
pub fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    cmp_component(a.standard_hz, b.standard_hz, false)
        .then_with(|| cmp_component(a.condition_isi, b.condition_isi, true))
        .then_with(|| cmp_component(a.comparison_hz, b.comparison_hz, true))
}

/// Stable in-place sort of typed rows into canonical order.
pub fn sort_trial_rows(rows: &mut [TrialRow]) {
    rows.sort_by(|a, b| compare_keys(&SortKey::of(a), &SortKey::of(b)));
}

/// Stable in-place sort of a raw table into canonical order.
///
/// Only the three key columns are parsed; every other cell is left as text.
///
/// # Errors
///
/// `MissingColumns` if a key column is absent, `TypeMismatch` if a key cell
/// is neither missing nor numeric. The table is unchanged on error.
pub fn sort_trial_table(table: &mut TrialTable) -> Result<(), LoaderError> {
    let [standard, isi, comparison] = table.require_columns(SORT_COLUMNS)?;

    let mut keyed = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let key = SortKey {
            standard_hz: table.numeric_cell(row, standard)?,
            condition_isi: table.numeric_cell(row, isi)?,
            comparison_hz: table.numeric_cell(row, comparison)?,
        };
        keyed.push((key, row));
    }

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b));

    let mut records = std::mem::take(&mut table.records);
    table.records = keyed
        .into_iter()
        .map(|(_, row)| std::mem::take(&mut records[row]))
        .collect();

    Ok(())
}

/// Normalize one file.
///
/// Loads `source`, sorts it and writes the result to `dest` unless
/// `dry_run` is set. Nothing is written when the file is rejected.
///
/// # Returns
///
/// The number of data rows.
pub fn normalize_file(source: &Path, dest: &Path, dry_run: bool) -> Result<usize, NormalizeError> {
    let mut table = load_trial_table(source)?;
    sort_trial_table(&mut table)?;

    if !dry_run {
        write_trial_table(dest, &table)?;
    }

    Ok(table.len())
}

/// Outcome of normalizing one directory.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    /// Destination paths of files written (or that would be, on a dry run).
    pub written: Vec<PathBuf>,
    /// Files left out of the destination directory.
    pub skipped: Vec<SkippedFile<NormalizeError>>,
}

impl NormalizeReport {
    /// Skipped files that lacked a sort column.
    pub fn missing_columns_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason.is_missing_columns())
            .count()
    }

    /// Skipped files that failed for any other reason.
    pub fn failed_count(&self) -> usize {
        self.skipped.len() - self.missing_columns_count()
    }
}

/// Normalize every `.csv` file of `source_dir` into `dest_dir`.
///
/// Output files keep their name. A file that fails is logged and skipped;
/// the rest of the batch still runs.
///
/// # Errors
///
/// Only when the source directory is missing or unreadable, or the
/// destination directory cannot be created.
pub fn normalize_directory(
    source_dir: &Path,
    dest_dir: &Path,
    dry_run: bool,
) -> Result<NormalizeReport, NormalizeError> {
    info!("Processing directory: {} -> {}", source_dir.display(), dest_dir.display());

    if !source_dir.is_dir() {
        error!("Error: Source directory does not exist: {}", source_dir.display());
        return Err(NormalizeError::DirectoryNotFound(source_dir.to_path_buf()));
    }

    if !dry_run && !dest_dir.exists() {
        fs::create_dir_all(dest_dir).map_err(|e| NormalizeError::CreateDirectory {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;
        info!("Created directory: {}", dest_dir.display());
    }

    let csv_files = list_csv_files(source_dir).map_err(|e| NormalizeError::ReadDirectory {
        path: source_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = NormalizeReport::default();

    if csv_files.is_empty() {
        warn!("No CSV files found in {}", source_dir.display());
        return Ok(report);
    }

    for source_path in csv_files {
        let file_name = file_name_of(&source_path);
        let dest_path = dest_dir.join(&file_name);

        match normalize_file(&source_path, &dest_path, dry_run) {
            Ok(rows) => {
                if dry_run {
                    info!("Would save: {} ({} rows)", file_name, rows);
                } else {
                    info!("Processed and saved: {} ({} rows)", file_name, rows);
                }
                report.written.push(dest_path);
            }
            Err(e) => {
                if e.is_missing_columns() {
                    warn!("Skipping {}: {}", file_name, e);
                } else {
                    error!("Error processing {}: {}", file_name, e);
                }
                report.skipped.push(SkippedFile {
                    file_name,
                    reason: e,
                });
            }
        }
    }

    Ok(report)
}
