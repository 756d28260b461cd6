//! Tunable parameters for the lifecycle services.
//!
//! These structs are embedded in the `mortality`, `marriage`, `births`, and
//! `careers` sections of `civitas-config.yaml`. Every field has a default,
//! so a partial section only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::error::PopulationError;

/// One row of the mortality table.
///
/// A band covers ages `min_age..=max_age` and carries the probability of
/// dying within one year at those ages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardBand {
    /// Youngest age covered, inclusive.
    pub min_age: u32,
    /// Oldest age covered, inclusive.
    pub max_age: u32,
    /// Probability of death within a year, in `[0, 1]`.
    pub yearly_probability: f64,
}

/// Mortality configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityConfig {
    /// Ordered age bands; the first band containing an age wins.
    #[serde(default = "default_bands")]
    pub bands: Vec<HazardBand>,

    /// Explicit seed; derived from the world seed when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MortalityConfig {
    fn default() -> Self {
        Self {
            bands: default_bands(),
            seed: None,
        }
    }
}

/// A life table loosely modelled on Republican Rome.
fn default_bands() -> Vec<HazardBand> {
    let band = |min_age, max_age, yearly_probability| HazardBand {
        min_age,
        max_age,
        yearly_probability,
    };
    vec![
        band(0, 4, 0.08),
        band(5, 14, 0.01),
        band(15, 29, 0.012),
        band(30, 44, 0.018),
        band(45, 59, 0.03),
        band(60, 69, 0.06),
        band(70, 79, 0.12),
        band(80, 89, 0.2),
        band(90, 120, 0.35),
    ]
}

/// Marriage matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarriageConfig {
    /// Minimum age for men to marry.
    #[serde(default = "default_min_age_male")]
    pub min_age_male: u32,

    /// Minimum age for women to marry.
    #[serde(default = "default_min_age_female")]
    pub min_age_female: u32,

    /// Maximum pairing attempts per day.
    #[serde(default = "default_daily_matchmaking_cap")]
    pub daily_matchmaking_cap: u32,

    /// Probability that a selected pair actually marries.
    #[serde(default = "default_match_probability")]
    pub match_probability: f64,

    /// Multiplicative preference for a partner of the same class.
    #[serde(default = "default_same_class_weight")]
    pub same_class_weight: f64,

    /// Whether partners of different classes may marry at all.
    #[serde(default = "default_true")]
    pub allow_cross_class: bool,

    /// Give zero weight to siblings, half-siblings, and parent-child pairs.
    #[serde(default = "default_true")]
    pub forbid_close_kin: bool,

    /// Explicit seed; derived from the world seed when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MarriageConfig {
    fn default() -> Self {
        Self {
            min_age_male: default_min_age_male(),
            min_age_female: default_min_age_female(),
            daily_matchmaking_cap: default_daily_matchmaking_cap(),
            match_probability: default_match_probability(),
            same_class_weight: default_same_class_weight(),
            allow_cross_class: true,
            forbid_close_kin: true,
            seed: None,
        }
    }
}

impl MarriageConfig {
    /// Check that probabilities and weights are usable.
    pub fn validate(&self) -> Result<(), PopulationError> {
        if !(0.0..=1.0).contains(&self.match_probability) {
            return Err(PopulationError::InvalidConfig {
                reason: format!(
                    "match_probability must be in [0, 1], got {}",
                    self.match_probability
                ),
            });
        }
        if !self.same_class_weight.is_finite() || self.same_class_weight < 0.0 {
            return Err(PopulationError::InvalidConfig {
                reason: format!(
                    "same_class_weight must be finite and non-negative, got {}",
                    self.same_class_weight
                ),
            });
        }
        Ok(())
    }
}

/// Birth configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthConfig {
    /// Whether births happen at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Probability that an eligible married woman gives birth within a year.
    #[serde(default = "default_birth_probability")]
    pub yearly_probability: f64,

    /// Youngest fertile age, inclusive.
    #[serde(default = "default_min_mother_age")]
    pub min_mother_age: u32,

    /// Oldest fertile age, inclusive.
    #[serde(default = "default_max_mother_age")]
    pub max_mother_age: u32,

    /// Explicit seed; derived from the world seed when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for BirthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            yearly_probability: default_birth_probability(),
            min_mother_age: default_min_mother_age(),
            max_mother_age: default_max_mother_age(),
            seed: None,
        }
    }
}

impl BirthConfig {
    /// Check the probability and the fertile window.
    pub fn validate(&self) -> Result<(), PopulationError> {
        if !(0.0..=1.0).contains(&self.yearly_probability) {
            return Err(PopulationError::InvalidConfig {
                reason: format!(
                    "births.yearly_probability must be in [0, 1], got {}",
                    self.yearly_probability
                ),
            });
        }
        if self.min_mother_age > self.max_mother_age {
            return Err(PopulationError::InvalidConfig {
                reason: "births.min_mother_age exceeds max_mother_age".to_owned(),
            });
        }
        Ok(())
    }
}

/// Annual career evolution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerConfig {
    /// Age at which everyone retires.
    #[serde(default = "default_retirement_age")]
    pub retirement_age: u32,

    /// Age from which a low-intensity character may retire early.
    #[serde(default = "default_early_retirement_age")]
    pub early_retirement_age: u32,

    /// Intensity at or below which early retirement triggers.
    #[serde(default = "default_early_retirement_intensity")]
    pub early_retirement_intensity: u32,

    /// Largest yearly move of intensity toward its desired value.
    #[serde(default = "default_max_intensity_step")]
    pub max_intensity_step: u32,
}

impl Default for CareerConfig {
    fn default() -> Self {
        Self {
            retirement_age: default_retirement_age(),
            early_retirement_age: default_early_retirement_age(),
            early_retirement_intensity: default_early_retirement_intensity(),
            max_intensity_step: default_max_intensity_step(),
        }
    }
}

const fn default_min_age_male() -> u32 {
    16
}

const fn default_min_age_female() -> u32 {
    14
}

const fn default_daily_matchmaking_cap() -> u32 {
    2
}

const fn default_match_probability() -> f64 {
    0.35
}

const fn default_same_class_weight() -> f64 {
    3.0
}

const fn default_birth_probability() -> f64 {
    0.25
}

const fn default_min_mother_age() -> u32 {
    16
}

const fn default_max_mother_age() -> u32 {
    42
}

const fn default_retirement_age() -> u32 {
    65
}

const fn default_early_retirement_age() -> u32 {
    55
}

const fn default_early_retirement_intensity() -> u32 {
    15
}

const fn default_max_intensity_step() -> u32 {
    3
}

const fn default_true() -> bool {
    true
}
