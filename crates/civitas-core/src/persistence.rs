//! Saved simulation state.
//!
//! A [`PersistedState`] holds everything needed to continue a run exactly
//! where it stopped: every character record, living and retained-dead
//! membership, the position of each random stream, the next free ID, and
//! the last simulated day. It round-trips through JSON.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use civitas_population::RngState;
use civitas_types::{Character, CharacterId, SimDate};

/// Format version written by this build.
pub const STATE_VERSION: u32 = 1;

/// Errors that can occur while saving or loading state.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Reading or writing the state file failed.
    #[error("state file I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The state is not valid JSON for this format.
    #[error("state JSON is malformed: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The state was written by an incompatible build.
    #[error("unsupported state version {found} (expected {STATE_VERSION})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
    },

    /// The state parsed but contradicts itself.
    #[error("inconsistent state: {reason}")]
    InvalidState {
        /// Explanation of the inconsistency.
        reason: String,
    },
}

/// Random stream positions of the lifecycle services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStates {
    /// Mortality stream.
    pub mortality: RngState,
    /// Marriage stream.
    pub marriage: RngState,
    /// Birth stream.
    pub births: RngState,
}

/// Everything needed to resume a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Format version.
    pub version: u32,

    /// The last day fully processed.
    pub date: SimDate,

    /// Every stored character, living or dead, in ID order.
    pub characters: Vec<Character>,

    /// IDs of living characters.
    pub living_ids: BTreeSet<CharacterId>,

    /// IDs of dead characters retained for historical queries.
    pub dead_ids: BTreeSet<CharacterId>,

    /// Whether dead characters are retained.
    pub keep_dead: bool,

    /// Random stream positions.
    pub streams: StreamStates,

    /// The next ID to hand out.
    pub next_id: CharacterId,
}

impl PersistedState {
    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and check state produced by [`PersistedState::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Json`] for malformed input,
    /// [`PersistenceError::UnsupportedVersion`] for another format version,
    /// or [`PersistenceError::InvalidState`] if the state contradicts itself.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let state: Self = serde_json::from_str(json)?;
        state.check()?;
        Ok(state)
    }

    /// Write the state to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] on serialization or I/O failure.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        tracing::info!(
            path = %path.display(),
            characters = self.characters.len(),
            date = %self.date,
            "State saved"
        );
        Ok(())
    }

    /// Read state from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] on I/O failure or invalid content.
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let json = std::fs::read_to_string(path)?;
        let state = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            characters = state.characters.len(),
            date = %state.date,
            "State loaded"
        );
        Ok(state)
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.version != STATE_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: self.version,
            });
        }
        if let Some(id) = self.living_ids.intersection(&self.dead_ids).next() {
            return Err(PersistenceError::InvalidState {
                reason: format!("character {id} is listed as both living and dead"),
            });
        }
        let mut seen = BTreeSet::new();
        for character in &self.characters {
            if !seen.insert(character.id) {
                return Err(PersistenceError::InvalidState {
                    reason: format!("character {} is stored twice", character.id),
                });
            }
            if character.id >= self.next_id {
                return Err(PersistenceError::InvalidState {
                    reason: format!(
                        "character {} is not below the next free ID {}",
                        character.id, self.next_id
                    ),
                });
            }
        }
        Ok(())
    }
}
