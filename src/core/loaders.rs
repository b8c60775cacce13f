//! Data loaders for subject trial-log CSV files.
//!
//! Two views of the same file are provided:
//! - [`TrialTable`]: every column and cell kept as text, header order preserved.
//!   The normalizer works on this so unrelated columns survive untouched.
//! - [`TrialFile`]: typed [`TrialRow`]s with the seven columns the JND extractor
//!   reads, validated at load time.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

pub const SUBJ_ID: &str = "Subj_ID";
pub const STANDARD_HZ: &str = "Standard_Hz";
pub const CONDITION_ISI: &str = "Condition_ISI";
pub const COMPARISON_HZ: &str = "Comparison_Hz";
pub const DELTA_HZ: &str = "Delta_Hz";
pub const ACCURACY: &str = "Accuracy";
pub const CONDITION_FREQ: &str = "Condition_Freq";

/// Columns a [`TrialRow`] is built from.
pub const TRIAL_COLUMNS: [&str; 7] = [
    SUBJ_ID,
    STANDARD_HZ,
    CONDITION_ISI,
    COMPARISON_HZ,
    DELTA_HZ,
    ACCURACY,
    CONDITION_FREQ,
];

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required columns {missing:?} in {}. Found columns: {found:?}", path.display())]
    MissingColumns {
        path: PathBuf,
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("Row {row} of {} has {found} fields, header has {expected}", path.display())]
    TooManyFields {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Non-numeric value '{value}' in column {column}, row {row} of {}", path.display())]
    TypeMismatch {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Cell text read as a missing value, as R and spreadsheet exports write it.
pub const MISSING_MARKERS: [&str; 17] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "null",
];

/// Parse a numeric cell.
///
/// Empty cells and [`MISSING_MARKERS`] read as NaN, which never compares
/// equal to anything. `None` means the cell holds text that is not a number.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        return Some(f64::NAN);
    }
    trimmed.parse::<f64>().ok()
}

/// A trial-log CSV kept as raw text.
#[derive(Debug, Clone)]
pub struct TrialTable {
    /// Header row, in file order.
    pub headers: StringRecord,
    /// Data rows, in file order.
    pub records: Vec<StringRecord>,
    /// Source file path.
    pub source_path: Option<PathBuf>,
}

impl TrialTable {
    /// Returns the number of data rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no data rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Header names, in file order.
    pub fn header_names(&self) -> Vec<String> {
        self.headers.iter().map(str::to_string).collect()
    }

    /// Names from `required` that do not appear in the header.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    /// Resolve `required` to column indices, or report which are missing.
    pub fn require_columns<const N: usize>(&self, required: [&str; N]) -> Result<[usize; N]> {
        let missing = self.missing_columns(&required);
        if !missing.is_empty() {
            return Err(LoaderError::MissingColumns {
                path: self.path_or_default(),
                missing,
                found: self.header_names(),
            });
        }

        let mut indices = [0usize; N];
        for (slot, name) in indices.iter_mut().zip(required.iter()) {
            // presence checked above
            *slot = self.column_index(name).unwrap_or_default();
        }
        Ok(indices)
    }

    /// Parse a numeric cell of data row `row` (0-based).
    pub fn numeric_cell(&self, row: usize, column: usize) -> Result<f64> {
        let value = self.records[row].get(column).unwrap_or("");
        parse_numeric(value).ok_or_else(|| LoaderError::TypeMismatch {
            path: self.path_or_default(),
            row: row + 1,
            column: self.headers.get(column).unwrap_or("").to_string(),
            value: value.to_string(),
        })
    }

    fn path_or_default(&self) -> PathBuf {
        self.source_path.clone().unwrap_or_default()
    }
}

/// Load a trial-log CSV as raw text.
///
/// The first line is the header. Rows shorter than the header are padded
/// with empty cells.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is not valid CSV, or has a
/// row longer than the header.
pub fn load_trial_table<P: AsRef<Path>>(path: P) -> Result<TrialTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let width = headers.len();

    let mut records = Vec::with_capacity(512);
    for (i, result) in reader.records().enumerate() {
        let mut record = result?;
        if record.len() > width {
            return Err(LoaderError::TooManyFields {
                path: path.to_path_buf(),
                row: i + 1,
                expected: width,
                found: record.len(),
            });
        }
        while record.len() < width {
            record.push_field("");
        }
        records.push(record);
    }

    Ok(TrialTable {
        headers,
        records,
        source_path: Some(path.to_path_buf()),
    })
}

/// One trial of a subject session.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRow {
    pub subj_id: String,
    /// Reference tone frequency.
    pub standard_hz: f64,
    /// Inter-stimulus interval category.
    pub condition_isi: f64,
    /// Probe tone frequency.
    pub comparison_hz: f64,
    /// Gap between comparison and standard.
    pub delta_hz: f64,
    /// 1 for a correct response, 0 otherwise.
    pub accuracy: f64,
    /// Nominal frequency condition.
    pub condition_freq: f64,
}

/// Ordered trials of one subject file.
#[derive(Debug, Clone, Default)]
pub struct TrialFile {
    pub rows: Vec<TrialRow>,
    pub source_path: Option<PathBuf>,
}

impl TrialFile {
    /// Build typed rows from a raw table.
    ///
    /// # Errors
    ///
    /// `MissingColumns` if any of [`TRIAL_COLUMNS`] is absent, `TypeMismatch`
    /// on the first non-numeric cell in a numeric column.
    pub fn from_table(table: &TrialTable) -> Result<Self> {
        let [subj, standard, isi, comparison, delta, accuracy, freq] =
            table.require_columns(TRIAL_COLUMNS)?;

        let mut rows = Vec::with_capacity(table.len());
        for (i, record) in table.records.iter().enumerate() {
            rows.push(TrialRow {
                subj_id: record.get(subj).unwrap_or("").to_string(),
                standard_hz: table.numeric_cell(i, standard)?,
                condition_isi: table.numeric_cell(i, isi)?,
                comparison_hz: table.numeric_cell(i, comparison)?,
                delta_hz: table.numeric_cell(i, delta)?,
                accuracy: table.numeric_cell(i, accuracy)?,
                condition_freq: table.numeric_cell(i, freq)?,
            });
        }

        Ok(Self {
            rows,
            source_path: table.source_path.clone(),
        })
    }

    /// Subject identifier, taken from the first row.
    pub fn subject_id(&self) -> Option<&str> {
        self.rows.first().map(|row| row.subj_id.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load and validate a subject trial file.
pub fn load_trial_file<P: AsRef<Path>>(path: P) -> Result<TrialFile> {
    let table = load_trial_table(path)?;
    TrialFile::from_table(&table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "Subj_ID,Standard_Hz,Condition_ISI,Comparison_Hz,Delta_Hz,Accuracy,Condition_Freq";

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("500"), Some(500.0));
        assert_eq!(parse_numeric(" 2.5 "), Some(2.5));
        assert!(parse_numeric("").unwrap().is_nan());
        assert_eq!(parse_numeric("abc"), None);
    }

    #[test]
    fn test_load_trial_table_keeps_extra_columns() -> Result<()> {
        let file = write_csv(&[
            "Trial,Standard_Hz,Condition_ISI,Comparison_Hz,Note",
            "1,500,1000,510,first",
            "2,500,100,505,\"a, b\"",
        ]);

        let table = load_trial_table(file.path())?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.header_names()[4], "Note");
        assert_eq!(table.records[1].get(4), Some("a, b"));
        assert_eq!(table.column_index("Comparison_Hz"), Some(3));
        assert_eq!(table.missing_columns(&[STANDARD_HZ, SUBJ_ID]), vec!["Subj_ID".to_string()]);

        Ok(())
    }

    #[test]
    fn test_load_trial_file() -> Result<()> {
        let file = write_csv(&[HEADER, "S01,500,1000,510,10,1,500", "S01,500,100,505,5,0,500"]);

        let trials = load_trial_file(file.path())?;
        assert_eq!(trials.len(), 2);
        assert_eq!(trials.subject_id(), Some("S01"));
        assert_eq!(trials.rows[0].delta_hz, 10.0);
        assert_eq!(trials.rows[1].condition_isi, 100.0);
        assert_eq!(trials.rows[1].accuracy, 0.0);

        Ok(())
    }

    #[test]
    fn test_load_trial_file_any_column_order() -> Result<()> {
        let file = write_csv(&[
            "Accuracy,Condition_Freq,Delta_Hz,Subj_ID,Comparison_Hz,Condition_ISI,Standard_Hz",
            "1,3000,30,P7,3030,100,3000",
        ]);

        let trials = load_trial_file(file.path())?;
        let row = &trials.rows[0];
        assert_eq!(row.subj_id, "P7");
        assert_eq!(row.condition_freq, 3000.0);
        assert_eq!(row.comparison_hz, 3030.0);
        assert_eq!(row.standard_hz, 3000.0);

        Ok(())
    }

    #[test]
    fn test_load_trial_file_missing_columns() {
        let file = write_csv(&["Subj_ID,Standard_Hz,Condition_ISI", "S01,500,1000"]);

        match load_trial_file(file.path()) {
            Err(LoaderError::MissingColumns { missing, found, .. }) => {
                assert!(missing.contains(&"Delta_Hz".to_string()));
                assert!(missing.contains(&"Accuracy".to_string()));
                assert_eq!(found.len(), 3);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_load_trial_file_type_mismatch() {
        let file = write_csv(&[HEADER, "S01,500,1000,510,10,1,500", "S01,500,long,505,5,0,500"]);

        match load_trial_file(file.path()) {
            Err(LoaderError::TypeMismatch { row, column, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "Condition_ISI");
                assert_eq!(value, "long");
            }
            other => panic!("Expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_load_trial_file_header_only() -> Result<()> {
        let file = write_csv(&[HEADER]);

        let trials = load_trial_file(file.path())?;
        assert!(trials.is_empty());
        assert_eq!(trials.subject_id(), None);

        Ok(())
    }

    #[test]
    fn test_load_trial_table_long_row() {
        let file = write_csv(&[
            "Standard_Hz,Condition_ISI,Comparison_Hz",
            "500,1000,510",
            "500,1000,510,extra",
        ]);

        match load_trial_table(file.path()) {
            Err(LoaderError::TooManyFields { row, expected, found, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 4);
            }
            other => panic!("Expected TooManyFields, got {:?}", other),
        }
    }

    #[test]
    fn test_load_trial_table_pads_short_row() -> Result<()> {
        let file = write_csv(&[
            "Standard_Hz,Condition_ISI,Comparison_Hz,Note",
            "500,100,505",
            "3000,1000,3010,x",
        ]);

        let table = load_trial_table(file.path())?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].len(), 4);
        assert_eq!(table.records[0].get(3), Some(""));
        assert_eq!(table.records[1].get(3), Some("x"));

        Ok(())
    }

    #[test]
    fn test_missing_markers_read_as_nan() {
        for marker in ["NA", "N/A", "#N/A", "null", "NULL", "None", "n/a", "-nan", " NA "] {
            assert!(parse_numeric(marker).unwrap().is_nan(), "{}", marker);
        }
        assert_eq!(parse_numeric("na"), None);
    }

    #[test]
    fn test_load_trial_file_missing_marker() -> Result<()> {
        let file = write_csv(&[HEADER, "S01,500,1000,510,10,1,500", "S01,500,1000,505,5,NA,500"]);

        let trials = load_trial_file(file.path())?;
        assert_eq!(trials.len(), 2);
        assert!(trials.rows[1].accuracy.is_nan());

        Ok(())
    }
}
