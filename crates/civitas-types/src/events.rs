//! Typed lifecycle events published by the population system.
//!
//! Each variant wraps a `*Details` payload struct so subscribers can match
//! on the variant and read strongly-typed fields. Events are emitted in a
//! deterministic order: within a day, by processing phase and then by
//! character ID.

use serde::{Deserialize, Serialize};

use crate::character::{AmbitionProfile, CareerMilestone};
use crate::date::SimDate;
use crate::ids::CharacterId;

/// A husband and wife joined on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarriagePair {
    /// The husband.
    pub husband: CharacterId,
    /// The wife.
    pub wife: CharacterId,
}

/// Summary of one simulated day's population changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationTickDetails {
    /// The day that was processed.
    pub date: SimDate,
    /// Children born today, in ID order.
    pub births: Vec<CharacterId>,
    /// Characters who died today, in ID order.
    pub deaths: Vec<CharacterId>,
    /// Marriages committed today, in commit order.
    pub marriages: Vec<MarriagePair>,
    /// Living population after the day's changes.
    pub living: usize,
}

/// A child was born.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBornDetails {
    /// The newborn.
    pub child: CharacterId,
    /// Father, when known.
    pub father: Option<CharacterId>,
    /// Mother.
    pub mother: CharacterId,
    /// Rendered name of the newborn.
    pub name: String,
    /// Birth date.
    pub date: SimDate,
}

/// A character died.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDiedDetails {
    /// The deceased.
    pub character: CharacterId,
    /// Rendered name at death.
    pub name: String,
    /// Age at death.
    pub age: u32,
    /// Date of death.
    pub date: SimDate,
}

/// Two characters married.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMarriedDetails {
    /// The couple.
    pub pair: MarriagePair,
    /// Wedding date.
    pub date: SimDate,
}

/// The externally observable part of an ambition profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbitionSnapshot {
    /// Goal label.
    pub goal: String,
    /// Intensity in `[0, 100]`.
    pub intensity: u32,
    /// Target year, if any.
    pub target_year: Option<i32>,
    /// Retirement flag.
    pub is_retired: bool,
}

impl AmbitionSnapshot {
    /// Capture the observable fields of `profile`.
    pub fn of(profile: &AmbitionProfile) -> Self {
        Self {
            goal: profile.goal.clone(),
            intensity: profile.intensity,
            target_year: profile.target_year,
            is_retired: profile.is_retired,
        }
    }
}

/// A character's ambition changed during the annual pass.
///
/// Emitted at most once per character per year, summarising every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbitionChangedDetails {
    /// The character.
    pub character: CharacterId,
    /// Simulated year of the pass.
    pub year: i32,
    /// Profile before the pass.
    pub before: AmbitionSnapshot,
    /// Profile after the pass.
    pub after: AmbitionSnapshot,
}

/// A trait record gained a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitAdvancedDetails {
    /// The character.
    pub character: CharacterId,
    /// Trait tag.
    pub tag: String,
    /// Level before the advance.
    pub from_level: u32,
    /// Level after the advance.
    pub to_level: u32,
    /// Year of the advance.
    pub year: i32,
}

/// A career milestone was appended to a character's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerMilestoneDetails {
    /// The character.
    pub character: CharacterId,
    /// The milestone as recorded.
    pub milestone: CareerMilestone,
}

/// A character retired from public life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetiredDetails {
    /// The character.
    pub character: CharacterId,
    /// Age at retirement.
    pub age: u32,
    /// Year of retirement.
    pub year: i32,
}

/// Every event the population system publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum PopulationEvent {
    /// End-of-day summary.
    PopulationTick(PopulationTickDetails),
    /// A child was born.
    CharacterBorn(CharacterBornDetails),
    /// A character died.
    CharacterDied(CharacterDiedDetails),
    /// Two characters married.
    CharacterMarried(CharacterMarriedDetails),
    /// Batched ambition change for one character and year.
    AmbitionChanged(AmbitionChangedDetails),
    /// A trait levelled up.
    TraitAdvanced(TraitAdvancedDetails),
    /// A milestone was recorded.
    CareerMilestoneRecorded(CareerMilestoneDetails),
    /// A character retired.
    Retired(RetiredDetails),
}

impl PopulationEvent {
    /// Short stable name of the variant, used as a log field.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PopulationTick(_) => "population_tick",
            Self::CharacterBorn(_) => "character_born",
            Self::CharacterDied(_) => "character_died",
            Self::CharacterMarried(_) => "character_married",
            Self::AmbitionChanged(_) => "ambition_changed",
            Self::TraitAdvanced(_) => "trait_advanced",
            Self::CareerMilestoneRecorded(_) => "career_milestone_recorded",
            Self::Retired(_) => "retired",
        }
    }

    /// The character the event is about, if it concerns exactly one.
    pub const fn subject(&self) -> Option<CharacterId> {
        match self {
            Self::PopulationTick(_) | Self::CharacterMarried(_) => None,
            Self::CharacterBorn(details) => Some(details.child),
            Self::CharacterDied(details) => Some(details.character),
            Self::AmbitionChanged(details) => Some(details.character),
            Self::TraitAdvanced(details) => Some(details.character),
            Self::CareerMilestoneRecorded(details) => Some(details.character),
            Self::Retired(details) => Some(details.character),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PopulationEvent::Retired(RetiredDetails {
            character: CharacterId::new(9),
            age: 65,
            year: -240,
        });
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["type"], "Retired");
        assert_eq!(json["details"]["age"], 65);
        assert_eq!(event.kind(), "retired");
        assert_eq!(event.subject(), Some(CharacterId::new(9)));
    }
}
