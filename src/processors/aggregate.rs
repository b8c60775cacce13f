//! Per-group folder scans and the combined JND summary.

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use super::jnd::{summarize_file, Group, SubjectSummary};
use super::{file_name_of, list_csv_files, SkippedFile};
use crate::config::{ExtractionConfig, PathConfig};
use crate::core::loaders::LoaderError;
use crate::core::writers::{write_records_csv, WriteError};

/// Result of scanning one group folder.
#[derive(Debug)]
pub struct GroupReport {
    pub group: Group,
    /// The folder did not exist or could not be listed.
    pub folder_missing: bool,
    /// One row per successfully processed file, in listing order.
    pub summaries: Vec<SubjectSummary>,
    pub skipped: Vec<SkippedFile<LoaderError>>,
}

impl GroupReport {
    fn empty(group: Group, folder_missing: bool) -> Self {
        Self {
            group,
            folder_missing,
            summaries: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Summarize every `.csv` file in `folder` as members of `group`.
///
/// A missing folder contributes no rows. A file that cannot be loaded is
/// logged and left out; no partial row is emitted for it.
pub fn process_folder(folder: &Path, group: Group, config: &ExtractionConfig) -> GroupReport {
    if !folder.is_dir() {
        warn!("Warning: Folder not found: {}", folder.display());
        return GroupReport::empty(group, true);
    }

    let csv_files = match list_csv_files(folder) {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to list {}: {}", folder.display(), e);
            return GroupReport::empty(group, true);
        }
    };

    let mut report = GroupReport::empty(group, false);
    report.summaries.reserve(csv_files.len());

    for path in csv_files {
        match summarize_file(&path, group, config.resort_before_select) {
            Ok(summary) => report.summaries.push(summary),
            Err(e) => {
                let file_name = file_name_of(&path);
                error!("Error processing {}: {}", file_name, e);
                report.skipped.push(SkippedFile {
                    file_name,
                    reason: e,
                });
            }
        }
    }

    report
}

/// Combined result of both groups.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Old-group rows followed by Young-group rows.
    pub summaries: Vec<SubjectSummary>,
    pub skipped: Vec<SkippedFile<LoaderError>>,
    pub missing_folders: Vec<PathBuf>,
}

impl ExtractionReport {
    /// Number of summary rows belonging to `group`.
    pub fn count_for(&self, group: Group) -> usize {
        self.summaries.iter().filter(|s| s.group == group).count()
    }
}

/// Run [`process_folder`] over the normalized Old and Young folders.
pub fn extract_groups(paths: &PathConfig, config: &ExtractionConfig) -> ExtractionReport {
    let mut combined = ExtractionReport::default();

    for (group, _, normalized_dir) in paths.groups() {
        info!("Processing {} Group...", group);
        let report = process_folder(normalized_dir, group, config);

        if report.folder_missing {
            combined.missing_folders.push(normalized_dir.to_path_buf());
        }
        combined.summaries.extend(report.summaries);
        combined.skipped.extend(report.skipped);
    }

    combined
}

/// Write the summary table to `output`.
///
/// # Returns
///
/// `None` without touching the filesystem when there are no rows.
pub fn save_summary(
    summaries: &[SubjectSummary],
    output: &Path,
) -> Result<Option<PathBuf>, WriteError> {
    if summaries.is_empty() {
        info!("No results found.");
        return Ok(None);
    }

    write_records_csv(output, summaries)?;
    info!("Summary saved to: {}", output.display());

    Ok(Some(output.to_path_buf()))
}
