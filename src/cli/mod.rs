//! Command-line interface for the JND pipeline.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::processors::aggregate::{extract_groups, save_summary};
use crate::processors::jnd::Group;
use crate::processors::normalize::{normalize_directory, NormalizeError};
use crate::report::{print_summary, render_summary_table};
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "jnd-pipeline")]
#[command(about = "Trial-log normalization and JND extraction", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort raw trial logs of both groups into their normalized folders
    Normalize {
        /// Check and sort files without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Compute per-subject JND values from the normalized folders
    Extract {
        /// Summary CSV path (overrides the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize, then extract
    Run {
        /// Summary CSV path (overrides the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the default configuration to a YAML file
    InitConfig {
        /// Destination YAML file
        path: PathBuf,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .format_timestamp_secs()
        .target(env_logger::Target::Stdout)
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    let result = match cli.command {
        Commands::Normalize { dry_run } => {
            cmd_normalize(&config, dry_run);
            Ok(())
        }
        Commands::Extract { output } => cmd_extract(&config, output),
        Commands::Run { output } => {
            cmd_normalize(&config, false);
            cmd_extract(&config, output)
        }
        Commands::InitConfig { path } => cmd_init_config(&config, &path),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn cmd_normalize(config: &PipelineConfig, dry_run: bool) {
    let start = Instant::now();

    if dry_run {
        println!("DRY RUN: No files will be written");
    }

    let mut items: Vec<(&str, String)> = Vec::new();
    let mut written = 0usize;
    let mut missing_columns = 0usize;
    let mut failed = 0usize;

    for (group, source, dest) in config.paths.groups() {
        let spinner = create_spinner(&format!("Normalizing {} group...", group));
        let result = normalize_directory(source, dest, dry_run);
        spinner.finish_and_clear();

        let status = match result {
            Ok(report) => {
                written += report.written.len();
                missing_columns += report.missing_columns_count();
                failed += report.failed_count();
                format!("{} written, {} skipped", report.written.len(), report.skipped.len())
            }
            // already logged by normalize_directory
            Err(NormalizeError::DirectoryNotFound(_)) => "source directory missing".to_string(),
            Err(e) => {
                error!("Normalizing {} failed: {}", source.display(), e);
                "failed".to_string()
            }
        };
        items.push((group_label(group), status));
    }

    info!("Done.");

    items.push(("Files written", written.to_string()));
    items.push(("Missing columns", missing_columns.to_string()));
    items.push(("Failed", failed.to_string()));
    items.push(("Dry run", dry_run.to_string()));
    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Normalization Complete", &items);
}

fn cmd_extract(config: &PipelineConfig, output: Option<PathBuf>) -> Result<()> {
    let start = Instant::now();
    let output_path = output.unwrap_or_else(|| config.paths.output_path.clone());

    let spinner = create_spinner("Extracting JND values...");
    let report = extract_groups(&config.paths, &config.extraction);
    spinner.finish_and_clear();

    let saved = save_summary(&report.summaries, &output_path)
        .with_context(|| format!("Failed to save summary to {}", output_path.display()))?;

    if saved.is_none() {
        // EmptyResults: nothing written, not an error
        return Ok(());
    }

    println!();
    println!("Calculated JND Values (Minimum Delta_Hz with Accuracy=1):");
    println!("{}", render_summary_table(&report.summaries));

    print_summary(
        "JND Extraction Complete",
        &[
            ("Summary file", output_path.display().to_string()),
            ("Old subjects", report.count_for(Group::Old).to_string()),
            ("Young subjects", report.count_for(Group::Young).to_string()),
            ("Files skipped", report.skipped.len().to_string()),
            ("Missing folders", report.missing_folders.len().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_init_config(config: &PipelineConfig, path: &Path) -> Result<()> {
    config
        .to_yaml(path)
        .map_err(|e| anyhow!("Failed to write config to {}: {}", path.display(), e))?;
    println!("Wrote configuration to {}", path.display());
    Ok(())
}

fn group_label(group: Group) -> &'static str {
    match group {
        Group::Old => "Old group",
        Group::Young => "Young group",
    }
}
