//! Error types for the civitas-population crate.
//!
//! Malformed data is never an error here: it is repaired in place and
//! reported through tracing or a validation sink. These variants cover
//! caller defects and invalid configuration only.

use civitas_types::CharacterId;

/// Errors that can occur during population operations.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// No character with the given ID is stored.
    #[error("character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// A mutation closure changed the identifier of the record it was given.
    #[error("character {expected} changed identity to {found} during modification")]
    IdentityChanged {
        /// ID the record was stored under.
        expected: CharacterId,
        /// ID the closure left on the record.
        found: CharacterId,
    },

    /// A mortality hazard band is malformed.
    #[error("invalid hazard band #{index}: {reason}")]
    InvalidHazardBand {
        /// Position of the band in the configured table.
        index: usize,
        /// Explanation of what is wrong with the band.
        reason: String,
    },

    /// A lifecycle service was configured with out-of-range values.
    #[error("invalid lifecycle configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// The identifier space is exhausted.
    #[error("character identifier overflow")]
    IdOverflow,
}
