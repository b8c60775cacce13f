//! Just-noticeable-difference selection per subject and condition.

use std::fmt;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize, Serializer};

use super::normalize::sort_trial_rows;
use crate::core::loaders::{load_trial_file, LoaderError, TrialFile, TrialRow};

/// Subject ID reported for a file with no data rows.
pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// Subject group of a trial file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    Old,
    Young,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Old => write!(f, "Old"),
            Group::Young => write!(f, "Young"),
        }
    }
}

/// A testing block: nominal frequency and inter-stimulus interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub freq: f64,
    pub isi: f64,
}

impl Condition {
    pub const fn new(freq: f64, isi: f64) -> Self {
        Self { freq, isi }
    }

    /// Summary column name, e.g. `JND_500_1000`.
    pub fn column_name(&self) -> String {
        format!("JND_{}_{}", self.freq, self.isi)
    }

    #[inline]
    pub fn matches(&self, row: &TrialRow) -> bool {
        row.condition_freq == self.freq && row.condition_isi == self.isi
    }
}

/// The four blocks summarized per subject, in summary column order.
pub const CONDITIONS: [Condition; 4] = [
    Condition::new(500.0, 1000.0),
    Condition::new(500.0, 100.0),
    Condition::new(3000.0, 1000.0),
    Condition::new(3000.0, 100.0),
];

/// Smallest `Delta_Hz` still answered correctly in one condition.
///
/// Rows matching `freq` and `isi` are walked from last to first and the
/// `Delta_Hz` of the first correct trial is returned. In normalized order the
/// walk runs from the comparison tone nearest the standard outward.
///
/// Returns `None` when no row matches or none of the matching rows is
/// correct. An empty `Delta_Hz` cell on the selected row also yields `None`.
pub fn get_min_jnd(rows: &[TrialRow], freq: f64, isi: f64) -> Option<f64> {
    let condition = Condition::new(freq, isi);
    rows.iter()
        .filter(|row| condition.matches(row))
        .rev()
        .find(|row| row.accuracy == 1.0)
        .map(|row| row.delta_hz)
        .filter(|delta| !delta.is_nan())
}

/// Text of a JND value, shared by the summary CSV and the console table.
///
/// Whole values keep their decimal point (`2.0`); absent values are empty.
pub fn format_jnd(value: Option<f64>) -> String {
    value.map(|v| format!("{:?}", v)).unwrap_or_default()
}

fn serialize_jnd<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_jnd(*value))
}

/// One row of the JND summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub filename: String,
    #[serde(rename = "Subj_ID")]
    pub subj_id: String,
    #[serde(rename = "Group")]
    pub group: Group,
    #[serde(rename = "JND_500_1000", serialize_with = "serialize_jnd")]
    pub jnd_500_1000: Option<f64>,
    #[serde(rename = "JND_500_100", serialize_with = "serialize_jnd")]
    pub jnd_500_100: Option<f64>,
    #[serde(rename = "JND_3000_1000", serialize_with = "serialize_jnd")]
    pub jnd_3000_1000: Option<f64>,
    #[serde(rename = "JND_3000_100", serialize_with = "serialize_jnd")]
    pub jnd_3000_100: Option<f64>,
}

impl SubjectSummary {
    /// JND values in [`CONDITIONS`] order.
    pub fn jnd_values(&self) -> [Option<f64>; 4] {
        [
            self.jnd_500_1000,
            self.jnd_500_100,
            self.jnd_3000_1000,
            self.jnd_3000_100,
        ]
    }
}

/// Build the summary row for an already-loaded subject file.
///
/// Rows are used in the order given.
pub fn summarize_trials(filename: &str, group: Group, trials: &TrialFile) -> SubjectSummary {
    let [a, b, c, d] =
        CONDITIONS.map(|condition| get_min_jnd(&trials.rows, condition.freq, condition.isi));

    let summary = SubjectSummary {
        filename: filename.to_string(),
        subj_id: trials.subject_id().unwrap_or(UNKNOWN_SUBJECT).to_string(),
        group,
        jnd_500_1000: a,
        jnd_500_100: b,
        jnd_3000_1000: c,
        jnd_3000_100: d,
    };

    debug!(
        "{} [{}] {}: {:?}",
        summary.filename,
        summary.group,
        summary.subj_id,
        summary.jnd_values()
    );

    summary
}

/// Load one subject file and build its summary row.
///
/// With `resort` set, rows are first put into normalized order so the
/// result does not depend on the file having gone through the normalizer.
pub fn summarize_file(path: &Path, group: Group, resort: bool) -> Result<SubjectSummary, LoaderError> {
    let mut trials = load_trial_file(path)?;
    if resort {
        sort_trial_rows(&mut trials.rows);
    }

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(summarize_trials(&filename, group, &trials))
}
