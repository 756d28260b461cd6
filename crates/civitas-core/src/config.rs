//! Configuration loading and typed config structures for the Civitas simulation.
//!
//! The canonical configuration lives in `civitas-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads it. Every section and field
//! has a default, so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use civitas_population::{BirthConfig, CareerConfig, MarriageConfig, MortalityConfig, SeededRng};
use civitas_types::SimDate;

/// Salt for the mortality stream when no explicit seed is configured.
const MORTALITY_SALT: u64 = 1;
/// Salt for the marriage stream.
const MARRIAGE_SALT: u64 = 2;
/// Salt for the birth stream.
const BIRTH_SALT: u64 = 3;
/// Salt for per-character naming repairs during validation.
const NAMING_SALT: u64 = 4;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but makes no sense.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `civitas-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, start date, run length).
    #[serde(default)]
    pub world: WorldConfig,

    /// Age-banded mortality table.
    #[serde(default)]
    pub mortality: MortalityConfig,

    /// Marriage matching parameters.
    #[serde(default)]
    pub marriage: MarriageConfig,

    /// Birth parameters.
    #[serde(default)]
    pub births: BirthConfig,

    /// Ambition, trait, and retirement parameters.
    #[serde(default)]
    pub careers: CareerConfig,

    /// Base population source.
    #[serde(default)]
    pub population: PopulationConfig,

    /// State export settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// The first simulated day.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configured date does not exist.
    pub fn start_date(&self) -> Result<SimDate, ConfigError> {
        let world = &self.world;
        SimDate::new(world.start_year, world.start_month, world.start_day).ok_or_else(|| {
            ConfigError::Invalid {
                reason: format!(
                    "start date {}-{}-{} is not on the calendar",
                    world.start_year, world.start_month, world.start_day
                ),
            }
        })
    }

    /// Seed for the mortality stream.
    pub fn mortality_seed(&self) -> u64 {
        self.mortality
            .seed
            .unwrap_or_else(|| SeededRng::derived_seed(self.world.seed, MORTALITY_SALT))
    }

    /// Seed for the marriage stream.
    pub fn marriage_seed(&self) -> u64 {
        self.marriage
            .seed
            .unwrap_or_else(|| SeededRng::derived_seed(self.world.seed, MARRIAGE_SALT))
    }

    /// Seed for the birth stream.
    pub fn birth_seed(&self) -> u64 {
        self.births
            .seed
            .unwrap_or_else(|| SeededRng::derived_seed(self.world.seed, BIRTH_SALT))
    }

    /// Seed from which per-character naming repairs are derived.
    pub const fn naming_seed(&self) -> u64 {
        SeededRng::derived_seed(self.world.seed, NAMING_SALT)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// First simulated year (negative before the common era).
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    /// First simulated month.
    #[serde(default = "default_one")]
    pub start_month: u32,

    /// First simulated day of the month.
    #[serde(default = "default_one")]
    pub start_day: u32,

    /// Keep dead characters in the dead index for historical queries.
    #[serde(default = "default_true")]
    pub keep_dead: bool,

    /// Number of years the engine binary runs.
    #[serde(default = "default_years")]
    pub years: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            start_year: default_start_year(),
            start_month: 1,
            start_day: 1,
            keep_dead: true,
            years: default_years(),
        }
    }
}

/// Base population configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// JSON roster to load instead of the built-in families.
    #[serde(default)]
    pub base_roster: Option<PathBuf>,
}

/// State export configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Where the engine writes its final state, if anywhere.
    #[serde(default)]
    pub state_path: Option<PathBuf>,

    /// Saved state to resume from instead of seeding a new population.
    #[serde(default)]
    pub resume_from: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_world_name() -> String {
    "Res Publica".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_start_year() -> i32 {
    -248
}

const fn default_one() -> u32 {
    1
}

const fn default_true() -> bool {
    true
}

const fn default_years() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}
