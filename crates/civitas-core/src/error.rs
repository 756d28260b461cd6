//! Error types for the civitas-core crate.
//!
//! [`SimulationError`] wraps every failure the population system and its
//! runner can surface, so hosts can propagate with `?`.

use crate::calendar::CalendarError;
use crate::config::ConfigError;
use crate::persistence::PersistenceError;
use crate::roster::RosterError;

/// Errors that can occur while building or running the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// A lifecycle service failed.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: civitas_population::PopulationError,
    },

    /// The calendar could not advance.
    #[error("calendar error: {source}")]
    Calendar {
        /// The underlying calendar error.
        #[from]
        source: CalendarError,
    },

    /// Configuration was unusable.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Saved state could not be applied.
    #[error("persistence error: {source}")]
    Persistence {
        /// The underlying persistence error.
        #[from]
        source: PersistenceError,
    },

    /// The built-in roster could not be assembled.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: RosterError,
    },
}
