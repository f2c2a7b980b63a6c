//! Scenario configuration.
//!
//! A scenario is a YAML document; every section except `name` falls back to
//! the calibrated defaults below.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::TreeTraits;

fn default_seed() -> u64 {
    7
}

fn default_rainfall_csv() -> PathBuf {
    PathBuf::from("data/la_rainfall.csv")
}

fn default_trials() -> usize {
    10
}

fn default_mature_trees() -> usize {
    20
}

fn default_years() -> u32 {
    100
}

fn default_cold_year_prob() -> f64 {
    0.3
}

fn default_germination_rate() -> f64 {
    1.0 / 1000.0
}

fn default_tree_death_rate() -> f64 {
    1.0 / 400.0
}

fn default_bloom_probability() -> f64 {
    2.0 / 45.0
}

fn default_stress_bloom() -> f64 {
    1.0 / 45.0
}

fn default_seed_death_rate() -> f64 {
    0.5
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("scenario validation error: {0}")]
    Validation(String),
}

/// Everything one experiment needs besides the rainfall record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Resolved against the scenario file's directory when relative.
    #[serde(default = "default_rainfall_csv")]
    pub rainfall_csv: PathBuf,
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub climate: ClimateConfig,
    #[serde(default)]
    pub demography: DemographyConfig,
    #[serde(default)]
    pub tree: TreeTraits,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default = "default_mature_trees")]
    pub mature_trees: usize,
    #[serde(default = "default_years")]
    pub years: u32,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            mature_trees: default_mature_trees(),
            years: default_years(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateConfig {
    #[serde(default = "default_cold_year_prob")]
    pub cold_year_prob: f64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            cold_year_prob: default_cold_year_prob(),
        }
    }
}

/// Population-level rates. The rainfall anomaly shifts most of them year to
/// year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographyConfig {
    #[serde(default = "default_germination_rate")]
    pub germination_rate: f64,
    #[serde(default = "default_tree_death_rate")]
    pub tree_death_rate: f64,
    #[serde(default = "default_bloom_probability")]
    pub bloom_probability: f64,
    /// Added to `bloom_probability` in dry or cold years.
    #[serde(default = "default_stress_bloom")]
    pub stress_bloom: f64,
    #[serde(default = "default_seed_death_rate")]
    pub seed_death_rate: f64,
}

impl Default for DemographyConfig {
    fn default() -> Self {
        Self {
            germination_rate: default_germination_rate(),
            tree_death_rate: default_tree_death_rate(),
            bloom_probability: default_bloom_probability(),
            stress_bloom: default_stress_bloom(),
            seed_death_rate: default_seed_death_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: "mojave_baseline".to_string(),
            description: None,
            seed: default_seed(),
            rainfall_csv: default_rainfall_csv(),
            experiment: ExperimentConfig::default(),
            climate: ClimateConfig::default(),
            demography: DemographyConfig::default(),
            tree: TreeTraits::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load, resolve the rainfall path, and validate a scenario file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: SimulationConfig =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        if config.rainfall_csv.is_relative() {
            if let Some(dir) = path.parent() {
                config.rainfall_csv = dir.join(&config.rainfall_csv);
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "scenario must define a name".to_string(),
            ));
        }

        check_probability("climate.cold_year_prob", self.climate.cold_year_prob)?;
        check_probability("demography.seed_death_rate", self.demography.seed_death_rate)?;
        check_probability("demography.tree_death_rate", self.demography.tree_death_rate)?;
        check_probability(
            "demography.germination_rate",
            self.demography.germination_rate,
        )?;
        check_probability(
            "demography.bloom_probability",
            self.demography.bloom_probability,
        )?;
        check_probability(
            "demography.bloom_probability + demography.stress_bloom",
            self.demography.bloom_probability + self.demography.stress_bloom,
        )?;
        if self.demography.stress_bloom < 0.0 {
            return Err(ConfigError::Validation(format!(
                "demography.stress_bloom must not be negative, got {}",
                self.demography.stress_bloom
            )));
        }

        let tree = &self.tree;
        check_range("tree.bloom", &(tree.bloom_min..tree.bloom_max))?;
        check_range("tree.flower", &(tree.flower_min..tree.flower_max))?;
        check_range("tree.maturation_window", &tree.maturation_window)?;
        check_range("tree.senescence_window", &tree.senescence_window)?;
        check_range("tree.founder_ages", &tree.founder_ages)?;
        check_probability("tree.pollination_rate", tree.pollination_rate)?;
        if !(tree.seeds_per_flower.is_finite() && tree.seeds_per_flower >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "tree.seeds_per_flower must be a non-negative number, got {}",
                tree.seeds_per_flower
            )));
        }

        Ok(())
    }
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{field} must lie in [0, 1], got {value}"
        )))
    }
}

fn check_range(field: &str, range: &Range<u32>) -> Result<(), ConfigError> {
    if range.start < range.end {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{field} range {}..{} is empty",
            range.start, range.end
        )))
    }
}
