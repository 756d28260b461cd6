//! Population store and lifecycle services for the Civitas simulation.
//!
//! Everything here operates on character records without touching I/O or
//! the calendar. The orchestrator in `civitas-core` decides when each
//! service runs; this crate decides what happens when it does.
//!
//! # Modules
//!
//! - [`repository`] -- The indexed character store ([`CharacterRepository`])
//! - [`mortality`] -- Age-banded hazards and daily death selection
//! - [`marriage`] -- Daily weighted matchmaking under a cap
//! - [`birth`] -- Births among married couples
//! - [`ambition`] -- Class and age driven career goals
//! - [`traits`] -- Trait experience and level-ups
//! - [`annual`] -- The once-a-year career pass ([`AnnualEvolution`])
//! - [`family`] -- Kinship queries ([`FamilyLookup`])
//! - [`naming`] -- Naming rules and ID allocation
//! - [`validation`] -- Strict and normalizing record checks
//! - [`rng`] -- Seeded, resumable random sources
//! - [`config`] -- Service parameters
//! - [`error`] -- Error types ([`PopulationError`])

pub mod ambition;
pub mod annual;
pub mod birth;
pub mod config;
pub mod error;
pub mod family;
pub mod marriage;
pub mod mortality;
pub mod naming;
pub mod repository;
pub mod rng;
pub mod traits;
pub mod validation;

// Re-export primary types at crate root for convenience.
pub use ambition::{AgeBracket, career_plan, evolve_ambition};
pub use annual::AnnualEvolution;
pub use birth::{BirthService, Parents, spawn_child};
pub use config::{BirthConfig, CareerConfig, HazardBand, MarriageConfig, MortalityConfig};
pub use error::PopulationError;
pub use family::FamilyLookup;
pub use marriage::{MarriageService, weighted_index};
pub use mortality::{HazardModel, HazardTable, MortalityService, yearly_to_daily};
pub use naming::{GenerationContext, IdAllocator, NamingRules, RomanNamingRules, TRAIT_POOL};
pub use repository::{CharacterRepository, IndexViolation};
pub use rng::{RngState, SeededRng};
pub use traits::{TraitAdvance, grow_traits, level_threshold};
pub use validation::{
    CharacterValidator, IssueKind, IssueSink, ValidationIssue, ValidationMode, ValidationReport,
};
