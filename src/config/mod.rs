//! Configuration types for the JND pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::processors::jnd::Group;

/// Source and destination locations for both subject groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Raw trial logs of the older-adult group
    #[serde(default = "default_source_old")]
    pub source_old: PathBuf,

    /// Normalized trial logs of the older-adult group
    #[serde(default = "default_dest_old")]
    pub dest_old: PathBuf,

    /// Raw trial logs of the young group
    #[serde(default = "default_source_young")]
    pub source_young: PathBuf,

    /// Normalized trial logs of the young group
    #[serde(default = "default_dest_young")]
    pub dest_young: PathBuf,

    /// Summary table written by the extractor
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_source_old() -> PathBuf {
    PathBuf::from("raw/older_adults")
}

fn default_dest_old() -> PathBuf {
    PathBuf::from("normalized/old")
}

fn default_source_young() -> PathBuf {
    PathBuf::from("raw/young_people")
}

fn default_dest_young() -> PathBuf {
    PathBuf::from("normalized/young")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("normalized/jnd_summary.csv")
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            source_old: default_source_old(),
            dest_old: default_dest_old(),
            source_young: default_source_young(),
            dest_young: default_dest_young(),
            output_path: default_output_path(),
        }
    }
}

impl PathConfig {
    /// `(group, raw dir, normalized dir)` in processing order: Old, then Young.
    pub fn groups(&self) -> [(Group, &Path, &Path); 2] {
        [
            (Group::Old, self.source_old.as_path(), self.dest_old.as_path()),
            (Group::Young, self.source_young.as_path(), self.dest_young.as_path()),
        ]
    }
}

/// Options for the JND extraction phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Re-apply the normalizer's ordering to each file before selecting.
    ///
    /// The selector scans rows in reverse, which only yields the smallest
    /// correct delta when rows are in normalized order. The sort is stable,
    /// so files that already went through the normalizer are unaffected.
    #[serde(default = "default_resort_before_select")]
    pub resort_before_select: bool,
}

fn default_resort_before_select() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            resort_before_select: default_resort_before_select(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
