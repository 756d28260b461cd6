//! The character record and its component value types.
//!
//! A [`Character`] is the central entity of the simulation. It is owned by
//! the population repository; relationship fields hold only
//! [`CharacterId`]s, which are resolved through the repository on demand.

use serde::{Deserialize, Serialize};

use crate::date::SimDate;
use crate::enums::{Faction, Gender, SocialClass};
use crate::ids::CharacterId;

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// A structured Roman name: given name, clan name, and optional cognomen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomanName {
    /// Personal given name. Women traditionally carry none.
    #[serde(default)]
    pub praenomen: Option<String>,
    /// Clan name, gendered (`Cornelius` / `Cornelia`).
    pub nomen: String,
    /// Branch or personal surname, if any.
    #[serde(default)]
    pub cognomen: Option<String>,
    /// Gender the name forms were declined for.
    pub gender: Gender,
}

impl RomanName {
    /// Build a name from its parts.
    pub fn new(
        praenomen: Option<&str>,
        nomen: &str,
        cognomen: Option<&str>,
        gender: Gender,
    ) -> Self {
        Self {
            praenomen: praenomen.map(str::to_owned),
            nomen: nomen.to_owned(),
            cognomen: cognomen.map(str::to_owned),
            gender,
        }
    }

    /// Render the name as it would be written, skipping absent parts.
    pub fn full_name(&self) -> String {
        [
            self.praenomen.as_deref(),
            Some(self.nomen.as_str()),
            self.cognomen.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

// ---------------------------------------------------------------------------
// Political stats
// ---------------------------------------------------------------------------

/// The four influence pools a character draws political power from.
///
/// Values arrive as raw floats and may be malformed; use
/// [`InfluencePools::sanitized`] before relying on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InfluencePools {
    /// Standing within the senate.
    pub senatorial: f64,
    /// Favour with the assemblies and the urban plebs.
    pub popular: f64,
    /// Loyalty of soldiers and veterans.
    pub military: f64,
    /// Weight of the family name and its clients.
    pub family: f64,
}

impl InfluencePools {
    /// Copy with every pool forced to a finite, non-negative value.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            senatorial: sanitize_pool(self.senatorial),
            popular: sanitize_pool(self.popular),
            military: sanitize_pool(self.military),
            family: sanitize_pool(self.family),
        }
    }

    /// Whether every pool is already finite and non-negative.
    pub fn is_sane(&self) -> bool {
        [self.senatorial, self.popular, self.military, self.family]
            .into_iter()
            .all(|value| value.is_finite() && value >= 0.0)
    }

    /// Sum of the four pools, after sanitising.
    pub fn total(&self) -> f64 {
        let clean = self.sanitized();
        clean.senatorial + clean.popular + clean.military + clean.family
    }
}

/// Clamp one influence value to a finite, non-negative number.
pub fn sanitize_pool(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// The eight bounded political attributes, each in `[0, 20]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliticalStats {
    /// Public speaking and persuasion.
    pub oratory: i32,
    /// Drive to climb the `cursus honorum`.
    pub ambition: i32,
    /// Physical and moral courage.
    pub courage: i32,
    /// Personal prestige and reputation.
    pub dignitas: i32,
    /// Competence at running offices and provinces.
    pub administration: i32,
    /// Soundness of political judgment.
    pub judgment: i32,
    /// Military strategy and command.
    pub strategy: i32,
    /// Devotion to civic duty and the public good.
    pub civic: i32,
}

impl PoliticalStats {
    /// Lowest legal attribute value.
    pub const MIN: i32 = 0;
    /// Highest legal attribute value.
    pub const MAX: i32 = 20;

    /// Build a stat block with every attribute set to `value`.
    pub const fn uniform(value: i32) -> Self {
        Self {
            oratory: value,
            ambition: value,
            courage: value,
            dignitas: value,
            administration: value,
            judgment: value,
            strategy: value,
            civic: value,
        }
    }

    /// Copy with every attribute clamped to `[MIN, MAX]`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let clamp = |value: i32| value.clamp(Self::MIN, Self::MAX);
        Self {
            oratory: clamp(self.oratory),
            ambition: clamp(self.ambition),
            courage: clamp(self.courage),
            dignitas: clamp(self.dignitas),
            administration: clamp(self.administration),
            judgment: clamp(self.judgment),
            strategy: clamp(self.strategy),
            civic: clamp(self.civic),
        }
    }

    /// Attributes in declaration order.
    pub const fn values(&self) -> [i32; 8] {
        [
            self.oratory,
            self.ambition,
            self.courage,
            self.dignitas,
            self.administration,
            self.judgment,
            self.strategy,
            self.civic,
        ]
    }

    /// Whether every attribute is already in range.
    pub fn is_within_bounds(&self) -> bool {
        self.values()
            .into_iter()
            .all(|value| (Self::MIN..=Self::MAX).contains(&value))
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A leveled personality trait with accumulated experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitRecord {
    /// Free-form trait tag (`"Disciplined"`, `"Eloquent"`).
    pub tag: String,
    /// Current level, at least 1.
    pub level: u32,
    /// Experience accumulated toward the next level, at least 0.
    pub experience: f64,
    /// Year the trait was first acquired.
    pub acquired_year: i32,
}

impl TraitRecord {
    /// A fresh level-1 record with no experience.
    pub fn new(tag: &str, acquired_year: i32) -> Self {
        Self {
            tag: tag.to_owned(),
            level: 1,
            experience: 0.0,
            acquired_year,
        }
    }
}

// ---------------------------------------------------------------------------
// Career
// ---------------------------------------------------------------------------

/// A dated line in a character's ambition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbitionHistoryEntry {
    /// Year the entry was recorded.
    pub year: i32,
    /// Human-readable description of the change.
    pub description: String,
}

/// A character's career goal, its intensity, and retirement state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbitionProfile {
    /// Current goal label, `"Retired"` once retired.
    pub goal: String,
    /// Drive toward the goal, in `[0, 100]`.
    pub intensity: u32,
    /// Year the character hopes to reach the goal.
    #[serde(default)]
    pub target_year: Option<i32>,
    /// Whether the character has withdrawn from public life.
    #[serde(default)]
    pub is_retired: bool,
    /// Last simulated year the annual pass evaluated this profile.
    #[serde(default)]
    pub last_evaluated_year: Option<i32>,
    /// Ordered history of notable changes.
    #[serde(default)]
    pub history: Vec<AmbitionHistoryEntry>,
}

impl AmbitionProfile {
    /// Highest legal intensity.
    pub const MAX_INTENSITY: u32 = 100;

    /// Goal label carried by every retired character.
    pub const RETIRED_GOAL: &'static str = "Retired";

    /// Append a dated history entry.
    pub fn record(&mut self, year: i32, description: impl Into<String>) {
        self.history.push(AmbitionHistoryEntry {
            year,
            description: description.into(),
        });
    }
}

/// A notable event in a character's career.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerMilestone {
    /// Short title.
    pub title: String,
    /// Year the milestone happened.
    pub year: i32,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

/// The office a character currently holds.
///
/// This is an immutable value: changing office produces a new value, and
/// clearing produces [`OfficeAssignment::empty`]. An assignment with a blank
/// office id is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeAssignment {
    office_id: String,
    seat_index: u32,
    start_year: i32,
}

impl OfficeAssignment {
    /// Assignment to `office_id`. A blank id yields the empty assignment.
    pub fn new(office_id: &str, seat_index: u32, start_year: i32) -> Self {
        let office_id = office_id.trim();
        if office_id.is_empty() {
            return Self::empty();
        }
        Self {
            office_id: office_id.to_owned(),
            seat_index,
            start_year,
        }
    }

    /// The "holds no office" value.
    pub const fn empty() -> Self {
        Self {
            office_id: String::new(),
            seat_index: 0,
            start_year: 0,
        }
    }

    /// Whether no office is held.
    pub fn is_empty(&self) -> bool {
        self.office_id.trim().is_empty()
    }

    /// A cleared copy; the receiver is left untouched.
    #[must_use]
    pub const fn cleared(&self) -> Self {
        Self::empty()
    }

    /// Office identifier, blank when empty.
    pub fn office_id(&self) -> &str {
        &self.office_id
    }

    /// Seat within the office's college.
    pub const fn seat_index(&self) -> u32 {
        self.seat_index
    }

    /// Year the term started.
    pub const fn start_year(&self) -> i32 {
        self.start_year
    }
}

/// A closed or still-open term in a past or current office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeHistoryEntry {
    /// Office identifier.
    pub office_id: String,
    /// Seat within the office's college.
    pub seat_index: u32,
    /// Year the term started.
    pub start_year: i32,
    /// Year the term ended; never earlier than `start_year`.
    #[serde(default)]
    pub end_year: Option<i32>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl OfficeHistoryEntry {
    /// Close the term at `year`, clamped so it never ends before it began.
    pub fn close(&mut self, year: i32) {
        self.end_year = Some(year.max(self.start_year));
    }

    /// Whether the end year, when present, is not before the start year.
    pub fn is_consistent(&self) -> bool {
        self.end_year.is_none_or(|end| end >= self.start_year)
    }
}

// ---------------------------------------------------------------------------
// Character
// ---------------------------------------------------------------------------

/// A single member of the simulated population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Unique, monotonically assigned identifier.
    pub id: CharacterId,
    /// Structured name.
    pub name: RomanName,
    /// Gender.
    pub gender: Gender,
    /// Birth year (signed).
    pub birth_year: i32,
    /// Birth month, 1 through 12.
    pub birth_month: u32,
    /// Birth day of month.
    pub birth_day: u32,
    /// Age in whole years.
    pub age: u32,
    /// Whether the character is alive.
    pub is_alive: bool,
    /// Current spouse.
    #[serde(default)]
    pub spouse_id: Option<CharacterId>,
    /// Father.
    #[serde(default)]
    pub father_id: Option<CharacterId>,
    /// Mother.
    #[serde(default)]
    pub mother_id: Option<CharacterId>,
    /// A sibling, typically the next-older one.
    #[serde(default)]
    pub sibling_id: Option<CharacterId>,
    /// Family (gens) name used for grouping.
    pub family: String,
    /// Branch of the family, usually the hereditary cognomen.
    #[serde(default)]
    pub branch: Option<String>,
    /// Social order.
    pub social_class: SocialClass,
    /// Free-form trait tags.
    #[serde(default)]
    pub traits: Vec<String>,
    /// Leveled trait records.
    #[serde(default)]
    pub trait_records: Vec<TraitRecord>,
    /// Personal wealth in denarii.
    #[serde(default)]
    pub wealth: u64,
    /// Aggregate influence score carried over from the base roster.
    #[serde(default)]
    pub influence: u32,
    /// Political influence pools.
    #[serde(default)]
    pub pools: InfluencePools,
    /// Bounded political attributes.
    #[serde(default)]
    pub stats: PoliticalStats,
    /// Declared faction.
    #[serde(default)]
    pub faction: Faction,
    /// Career goal and retirement state.
    #[serde(default)]
    pub ambition: AmbitionProfile,
    /// Ordered career milestones.
    #[serde(default)]
    pub career_milestones: Vec<CareerMilestone>,
    /// Office currently held.
    #[serde(default)]
    pub office: OfficeAssignment,
    /// Ordered office terms.
    #[serde(default)]
    pub office_history: Vec<OfficeHistoryEntry>,
}

impl Character {
    /// Create a living character with empty career state and neutral
    /// politics.
    pub fn new(
        id: CharacterId,
        name: RomanName,
        family: &str,
        social_class: SocialClass,
        birth: SimDate,
        age: u32,
    ) -> Self {
        Self {
            id,
            gender: name.gender,
            name,
            birth_year: birth.year,
            birth_month: birth.month,
            birth_day: birth.day,
            age,
            is_alive: true,
            spouse_id: None,
            father_id: None,
            mother_id: None,
            sibling_id: None,
            family: family.to_owned(),
            branch: None,
            social_class,
            traits: Vec::new(),
            trait_records: Vec::new(),
            wealth: 0,
            influence: 0,
            pools: InfluencePools::default(),
            stats: PoliticalStats::default(),
            faction: Faction::Neutral,
            ambition: AmbitionProfile::default(),
            career_milestones: Vec::new(),
            office: OfficeAssignment::empty(),
            office_history: Vec::new(),
        }
    }

    /// Rendered full name.
    pub fn full_name(&self) -> String {
        self.name.full_name()
    }

    /// Whether a spouse is recorded.
    pub const fn is_married(&self) -> bool {
        self.spouse_id.is_some()
    }

    /// Append a career milestone and return a copy of it.
    pub fn record_milestone(
        &mut self,
        title: impl Into<String>,
        year: i32,
        notes: impl Into<String>,
    ) -> CareerMilestone {
        let milestone = CareerMilestone {
            title: title.into(),
            year,
            notes: notes.into(),
        };
        self.career_milestones.push(milestone.clone());
        milestone
    }

    /// Take up a new office, closing any term still open.
    ///
    /// A blank `office_id` is equivalent to [`Character::vacate_office`].
    pub fn assign_office(&mut self, office_id: &str, seat_index: u32, year: i32) {
        self.vacate_office(year);
        let assignment = OfficeAssignment::new(office_id, seat_index, year);
        if assignment.is_empty() {
            return;
        }
        self.office_history.push(OfficeHistoryEntry {
            office_id: assignment.office_id().to_owned(),
            seat_index,
            start_year: year,
            end_year: None,
            notes: String::new(),
        });
        self.office = assignment;
    }

    /// Leave the current office, closing its open history entry at `year`.
    pub fn vacate_office(&mut self, year: i32) {
        if self.office.is_empty() {
            return;
        }
        let office_id = self.office.office_id().to_owned();
        if let Some(entry) = self
            .office_history
            .iter_mut()
            .rev()
            .find(|entry| entry.office_id == office_id && entry.end_year.is_none())
        {
            entry.close(year);
        }
        self.office = self.office.cleared();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Character {
        let name = RomanName::new(Some("Publius"), "Cornelius", Some("Scipio"), Gender::Male);
        let birth = SimDate::new(-285, 3, 12).unwrap_or(SimDate {
            year: -285,
            month: 3,
            day: 12,
        });
        Character::new(
            CharacterId::new(1),
            name,
            "Cornelius",
            SocialClass::Patrician,
            birth,
            37,
        )
    }

    #[test]
    fn full_name_skips_missing_parts() {
        let name = RomanName::new(None, "Cornelia", Some("Asina"), Gender::Female);
        assert_eq!(name.full_name(), "Cornelia Asina");
        assert_eq!(sample().full_name(), "Publius Cornelius Scipio");
    }

    #[test]
    fn pools_sanitize_non_finite_and_negative() {
        let pools = InfluencePools {
            senatorial: f64::NAN,
            popular: -4.0,
            military: f64::INFINITY,
            family: 2.5,
        };
        assert!(!pools.is_sane());
        let clean = pools.sanitized();
        assert!(clean.is_sane());
        assert!((clean.total() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_clamp_into_range() {
        let stats = PoliticalStats {
            oratory: 25,
            courage: -3,
            ..PoliticalStats::uniform(10)
        };
        assert!(!stats.is_within_bounds());
        let clamped = stats.clamped();
        assert_eq!(clamped.oratory, 20);
        assert_eq!(clamped.courage, 0);
        assert!(clamped.is_within_bounds());
    }

    #[test]
    fn blank_office_is_empty() {
        assert!(OfficeAssignment::new("   ", 2, -240).is_empty());
        let office = OfficeAssignment::new("quaestor", 1, -240);
        assert!(!office.is_empty());
        let cleared = office.cleared();
        assert!(cleared.is_empty());
        assert_eq!(office.office_id(), "quaestor");
    }

    #[test]
    fn office_history_never_ends_before_start() {
        let mut entry = OfficeHistoryEntry {
            office_id: "aedile".to_owned(),
            seat_index: 0,
            start_year: -240,
            end_year: None,
            notes: String::new(),
        };
        entry.close(-245);
        assert_eq!(entry.end_year, Some(-240));
        assert!(entry.is_consistent());
    }

    #[test]
    fn assigning_office_closes_previous_term() {
        let mut character = sample();
        character.assign_office("quaestor", 0, -250);
        character.assign_office("aedile", 1, -246);
        assert_eq!(character.office.office_id(), "aedile");
        assert_eq!(character.office_history.len(), 2);
        assert_eq!(character.office_history[0].end_year, Some(-246));
        assert_eq!(character.office_history[1].end_year, None);

        character.vacate_office(-245);
        assert!(character.office.is_empty());
        assert_eq!(character.office_history[1].end_year, Some(-245));
    }
}
