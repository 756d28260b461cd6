//! Shared type definitions for the Civitas population simulation.
//!
//! This crate is the single source of truth for the data model shared by
//! the population services, the political scoring pipeline, and the
//! orchestrator.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer identifier wrappers
//! - [`enums`] -- Gender, social class, and faction enumerations
//! - [`date`] -- The fixed 365-day simulated calendar date
//! - [`character`] -- The character record and its component values
//! - [`events`] -- Typed lifecycle events published by the engine

pub mod character;
pub mod date;
pub mod enums;
pub mod events;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use character::{
    AmbitionHistoryEntry, AmbitionProfile, CareerMilestone, Character, InfluencePools,
    OfficeAssignment, OfficeHistoryEntry, PoliticalStats, RomanName, TraitRecord, sanitize_pool,
};
pub use date::{DAYS_PER_YEAR, SimDate, days_in_month};
pub use enums::{Faction, Gender, SocialClass};
pub use events::{
    AmbitionChangedDetails, AmbitionSnapshot, CareerMilestoneDetails, CharacterBornDetails,
    CharacterDiedDetails, CharacterMarriedDetails, MarriagePair, PopulationEvent,
    PopulationTickDetails, RetiredDetails, TraitAdvancedDetails,
};
pub use ids::CharacterId;
