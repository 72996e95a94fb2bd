//! Configuration management for the CLI.
//!
//! Settings come from an optional TOML file (`medkg.toml` in the working
//! directory by default); command-line flags override file values.

use crate::error::Result;
use medkg_pipeline::config::{
    DEFAULT_CHECKPOINT_EVERY, DEFAULT_PHENOTYPE_CODE, DEFAULT_THRESHOLD_PCT,
};
use medkg_domain::validate::DEFAULT_WINDOW_DAYS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite population database.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Corroboration window in days.
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// Recurrence threshold percentage for cohort runs.
    #[serde(default = "default_threshold_pct")]
    pub threshold_pct: f64,

    /// Phenotype code seeding cohort runs.
    #[serde(default = "default_phenotype_code")]
    pub phenotype_code: String,

    /// Tally checkpoint cadence for cohort runs.
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
}

impl Config {
    /// Default configuration file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from("medkg.toml")
    }

    /// Load configuration from `path` (or the default path), falling back
    /// to defaults when the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            window_days: default_window_days(),
            threshold_pct: default_threshold_pct(),
            phenotype_code: default_phenotype_code(),
            checkpoint_every: default_checkpoint_every(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("population.db")
}

fn default_window_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

fn default_threshold_pct() -> f64 {
    DEFAULT_THRESHOLD_PCT
}

fn default_phenotype_code() -> String {
    DEFAULT_PHENOTYPE_CODE.to_string()
}

fn default_checkpoint_every() -> usize {
    DEFAULT_CHECKPOINT_EVERY
}
