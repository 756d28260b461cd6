//! Hazard-driven selection of the day's deaths.
//!
//! A [`HazardTable`] is built once from the configured age bands, converting
//! each yearly probability into a daily one. Every simulated day the
//! [`MortalityService`] draws exactly one random value per living character,
//! in ID order, and reports who dies. It never mutates the repository; the
//! caller marks the deaths and publishes the events.

use rand::Rng;

use civitas_types::{CharacterId, DAYS_PER_YEAR};

use crate::config::HazardBand;
use crate::error::PopulationError;
use crate::repository::CharacterRepository;
use crate::rng::{RngState, SeededRng};

/// Convert a yearly probability into the daily probability that compounds
/// back to it over a 365-day year: `1 - (1 - yearly)^(1/365)`.
///
/// Inputs are clamped to `[0, 1]`; non-finite inputs yield 0.
pub fn yearly_to_daily(yearly: f64) -> f64 {
    if !yearly.is_finite() || yearly <= 0.0 {
        return 0.0;
    }
    if yearly >= 1.0 {
        return 1.0;
    }
    1.0 - (1.0 - yearly).powf(1.0 / f64::from(DAYS_PER_YEAR))
}

/// Maps an age to a daily probability of death.
pub trait HazardModel {
    /// Daily probability of death at `age`, in `[0, 1]`.
    fn daily_hazard(&self, age: u32) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DailyBand {
    min_age: u32,
    max_age: u32,
    daily: f64,
}

/// Ordered age bands with precomputed daily hazards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HazardTable {
    bands: Vec<DailyBand>,
}

impl HazardTable {
    /// Validate the bands and convert them to daily hazards.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::InvalidHazardBand`] when a band's range is
    /// inverted or its probability lies outside `[0, 1]`.
    pub fn from_bands(bands: &[HazardBand]) -> Result<Self, PopulationError> {
        let mut converted = Vec::with_capacity(bands.len());
        for (index, band) in bands.iter().enumerate() {
            if band.min_age > band.max_age {
                return Err(PopulationError::InvalidHazardBand {
                    index,
                    reason: format!("min_age {} exceeds max_age {}", band.min_age, band.max_age),
                });
            }
            if !(0.0..=1.0).contains(&band.yearly_probability) {
                return Err(PopulationError::InvalidHazardBand {
                    index,
                    reason: format!(
                        "yearly_probability {} outside [0, 1]",
                        band.yearly_probability
                    ),
                });
            }
            converted.push(DailyBand {
                min_age: band.min_age,
                max_age: band.max_age,
                daily: yearly_to_daily(band.yearly_probability),
            });
        }
        Ok(Self { bands: converted })
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Whether the table has no bands, meaning nobody ever dies.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl HazardModel for HazardTable {
    fn daily_hazard(&self, age: u32) -> f64 {
        self.bands
            .iter()
            .find(|band| (band.min_age..=band.max_age).contains(&age))
            .map_or(0.0, |band| band.daily)
    }
}

/// Selects which living characters die on a given day.
#[derive(Debug, Clone)]
pub struct MortalityService<H = HazardTable> {
    hazard: H,
    rng: SeededRng,
}

impl<H: HazardModel> MortalityService<H> {
    /// Create a service owning `rng`.
    pub const fn new(hazard: H, rng: SeededRng) -> Self {
        Self { hazard, rng }
    }

    /// Draw one value per living character, in ID order, and return the IDs
    /// whose draw fell below their daily hazard.
    pub fn select_deaths(&mut self, repository: &CharacterRepository) -> Vec<CharacterId> {
        let mut deaths = Vec::new();
        for character in repository.get_all_living() {
            let hazard = self.hazard.daily_hazard(character.age);
            let hazard = if hazard.is_finite() {
                hazard.clamp(0.0, 1.0)
            } else {
                0.0
            };
            let roll: f64 = self.rng.random();
            if roll < hazard {
                deaths.push(character.id);
            }
        }
        deaths
    }

    /// The hazard model in use.
    pub const fn hazard(&self) -> &H {
        &self.hazard
    }

    /// Position of the owned random source.
    pub fn rng_state(&self) -> RngState {
        self.rng.state()
    }

    /// Replace the random source, e.g. when resuming a saved run.
    pub fn restore_rng(&mut self, state: RngState) {
        self.rng = SeededRng::restore(state);
    }
}
