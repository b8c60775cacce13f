//! Trial-log normalization and just-noticeable-difference (JND) extraction
//! for a two-group pitch discrimination experiment.
//!
//! This crate provides tools for:
//! - Sorting raw per-subject trial logs into a canonical row order
//! - Selecting, per subject and condition, the smallest frequency difference
//!   still answered correctly
//! - Collecting one summary row per subject into a CSV table
//!
//! # Example
//!
//! ```no_run
//! use jnd_pipeline::{core::loaders::load_trial_file, processors::jnd::get_min_jnd};
//!
//! let trials = load_trial_file("normalized/old/s01.csv").unwrap();
//! let jnd = get_min_jnd(&trials.rows, 500.0, 1000.0);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod report;

pub use config::{ExtractionConfig, PathConfig, PipelineConfig};
pub use core::loaders::{TrialFile, TrialRow, TrialTable};
pub use processors::jnd::{Group, SubjectSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
