// Run configuration: JSON file values, overridden by command-line flags

use crate::bucket::AgeBuckets;
use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where the built-in dataset is persisted when no input file is given
pub const DEFAULT_SAVE_PATH: &str = "online_shopping_data.csv";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Orders CSV to analyze; the built-in sample is used when absent
    pub input: Option<PathBuf>,
    /// Where to persist the canonical table
    pub save: Option<PathBuf>,
    pub charts_dir: PathBuf,
    pub render_charts: bool,
    /// Bucket notation, e.g. `20-25=[20,25]; 26-30=(25,30]`
    pub age_buckets: Option<String>,
    /// Optional JSON dump of every aggregate frame
    pub aggregates_json: Option<PathBuf>,
    pub render: RenderOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            save: None,
            charts_dir: PathBuf::from("charts"),
            render_charts: true,
            age_buckets: None,
            aggregates_json: None,
            render: RenderOptions::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid configuration JSON")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn age_buckets(&self) -> crate::Result<AgeBuckets> {
        match &self.age_buckets {
            Some(spec) => spec.parse(),
            None => Ok(AgeBuckets::default()),
        }
    }

    /// Explicit save path, or the default one when running on the built-in sample
    pub fn save_path(&self) -> Option<PathBuf> {
        match (&self.save, &self.input) {
            (Some(path), _) => Some(path.clone()),
            (None, None) => Some(PathBuf::from(DEFAULT_SAVE_PATH)),
            (None, Some(_)) => None,
        }
    }
}
