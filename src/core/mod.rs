//! Core data types and I/O operations.

pub mod loaders;
pub mod writers;

pub use loaders::{load_trial_file, load_trial_table, LoaderError, TrialFile, TrialRow, TrialTable};
pub use writers::{write_records_csv, write_trial_table, WriteError};
