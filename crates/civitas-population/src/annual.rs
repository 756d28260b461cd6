//! Once-a-year career evolution: ambition, traits, and retirement.
//!
//! [`AnnualEvolution::evolve`] updates one character and returns the
//! events it produced. Whatever changes during the pass, at most one
//! `AmbitionChanged` event is emitted per character, carrying the profile
//! as it was before and after.

use civitas_types::{
    AmbitionChangedDetails, AmbitionProfile, AmbitionSnapshot, CareerMilestone,
    CareerMilestoneDetails, Character, CharacterId, PopulationEvent, RetiredDetails,
    TraitAdvancedDetails,
};

use crate::ambition::evolve_ambition;
use crate::config::CareerConfig;
use crate::error::PopulationError;
use crate::repository::CharacterRepository;
use crate::traits::{ensure_records, grow_traits};

/// Applies the annual career pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnualEvolution {
    config: CareerConfig,
}

impl AnnualEvolution {
    /// Create the pass with the given thresholds.
    pub const fn new(config: CareerConfig) -> Self {
        Self { config }
    }

    /// Whether a character of `age` and `intensity` should retire now.
    pub const fn should_retire(&self, age: u32, intensity: u32) -> bool {
        age >= self.config.retirement_age
            || (age >= self.config.early_retirement_age
                && intensity <= self.config.early_retirement_intensity)
    }

    /// Run the pass for every living character, in ID order.
    pub fn run(
        &self,
        repository: &mut CharacterRepository,
        year: i32,
    ) -> Result<Vec<PopulationEvent>, PopulationError> {
        let mut events = Vec::new();
        for id in repository.living_ids() {
            let mut produced = repository.modify(id, |character| self.evolve(character, year))?;
            events.append(&mut produced);
        }
        Ok(events)
    }

    /// Evolve one character for `year`.
    ///
    /// A character already evaluated for `year` is skipped, so the pass is
    /// idempotent within a year.
    pub fn evolve(&self, character: &mut Character, year: i32) -> Vec<PopulationEvent> {
        let mut events = Vec::new();
        if !character.is_alive || character.ambition.last_evaluated_year == Some(year) {
            return events;
        }
        let id = character.id;
        let before = AmbitionSnapshot::of(&character.ambition);

        evolve_ambition(
            &mut character.ambition,
            character.social_class,
            character.age,
            year,
            self.config.max_intensity_step,
        );

        if !character.ambition.is_retired
            && self.should_retire(character.age, character.ambition.intensity)
        {
            retire(character, year, &mut events);
        }

        ensure_records(character, year);
        for advance in grow_traits(character) {
            events.push(PopulationEvent::TraitAdvanced(TraitAdvancedDetails {
                character: id,
                tag: advance.tag.clone(),
                from_level: advance.from_level,
                to_level: advance.to_level,
                year,
            }));
            let milestone = character.record_milestone(
                format!("{} mastery", advance.tag),
                year,
                format!("Reached level {}", advance.to_level),
            );
            push_milestone_event(id, milestone, &mut events);
        }

        character.ambition.last_evaluated_year = Some(year);
        let after = AmbitionSnapshot::of(&character.ambition);
        if after != before {
            events.push(PopulationEvent::AmbitionChanged(AmbitionChangedDetails {
                character: id,
                year,
                before,
                after,
            }));
        }
        events
    }
}

fn retire(character: &mut Character, year: i32, events: &mut Vec<PopulationEvent>) {
    let profile = &mut character.ambition;
    profile.is_retired = true;
    AmbitionProfile::RETIRED_GOAL.clone_into(&mut profile.goal);
    profile.target_year = None;
    profile.intensity = 0;
    profile.record(year, format!("Retired from public life at {}", character.age));

    tracing::debug!(id = %character.id, age = character.age, year, "Character retired");
    events.push(PopulationEvent::Retired(RetiredDetails {
        character: character.id,
        age: character.age,
        year,
    }));
    let notes = format!("Withdrew from public life aged {}", character.age);
    let milestone = character.record_milestone("Retirement", year, notes);
    push_milestone_event(character.id, milestone, events);
}

fn push_milestone_event(
    character: CharacterId,
    milestone: CareerMilestone,
    events: &mut Vec<PopulationEvent>,
) {
    events.push(PopulationEvent::CareerMilestoneRecorded(
        CareerMilestoneDetails {
            character,
            milestone,
        },
    ));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civitas_types::{Gender, RomanName, SimDate, SocialClass, TraitRecord};

    use super::*;

    fn senator(age: u32) -> Character {
        let name = RomanName::new(Some("Quintus"), "Fabius", Some("Maximus"), Gender::Male);
        let birth = SimDate::new(-313, 3, 12).unwrap();
        let mut character = Character::new(
            CharacterId::new(1),
            name,
            "Fabius",
            SocialClass::Patrician,
            birth,
            age,
        );
        character.ambition = AmbitionProfile {
            goal: "Consulship".to_owned(),
            intensity: 70,
            target_year: Some(-246),
            ..AmbitionProfile::default()
        };
        character
    }

    fn count(events: &[PopulationEvent], kind: &str) -> usize {
        events.iter().filter(|event| event.kind() == kind).count()
    }

    #[test]
    fn sixty_five_retires_with_single_events() {
        let mut character = senator(65);
        let events = AnnualEvolution::default().evolve(&mut character, -248);

        assert!(character.ambition.is_retired);
        assert_eq!(character.ambition.intensity, 0);
        assert_eq!(character.ambition.target_year, None);
        assert_eq!(character.ambition.goal, "Retired");
        assert_eq!(count(&events, "retired"), 1);
        assert_eq!(count(&events, "ambition_changed"), 1);
        assert!(character.career_milestones.iter().any(|m| m.title == "Retirement"));

        // Already retired: the next year fires no further retirement.
        let later = AnnualEvolution::default().evolve(&mut character, -247);
        assert_eq!(count(&later, "retired"), 0);
        assert_eq!(count(&later, "ambition_changed"), 0);
    }

    #[test]
    fn early_retirement_needs_low_intensity() {
        let pass = AnnualEvolution::default();
        assert!(pass.should_retire(55, 15));
        assert!(!pass.should_retire(55, 16));
        assert!(!pass.should_retire(54, 0));
        assert!(pass.should_retire(65, 100));
    }

    #[test]
    fn same_year_is_evaluated_once() {
        let mut character = senator(40);
        let pass = AnnualEvolution::default();
        let first = pass.evolve(&mut character, -248);
        assert!(!first.is_empty());
        let snapshot = character.clone();
        assert!(pass.evolve(&mut character, -248).is_empty());
        assert_eq!(character, snapshot);
    }

    #[test]
    fn ambition_change_is_batched() {
        let mut character = senator(25);
        character.ambition.intensity = 48;
        character.ambition.target_year = None;
        let events = AnnualEvolution::default().evolve(&mut character, -248);
        // Goal, intensity, and target all change, yet one notification fires.
        assert_eq!(count(&events, "ambition_changed"), 1);
        let Some(PopulationEvent::AmbitionChanged(details)) = events.last() else {
            panic!("ambition change should be the last event");
        };
        assert_eq!(details.before.intensity, 48);
        assert_eq!(details.after.intensity, 51);
        assert_eq!(details.after.target_year, Some(-243));
    }

    #[test]
    fn trait_levels_fire_advance_and_milestone() {
        let mut character = senator(40);
        character.trait_records = vec![TraitRecord {
            tag: "Strategic".to_owned(),
            level: 1,
            experience: 14.0,
            acquired_year: -270,
        }];
        let events = AnnualEvolution::default().evolve(&mut character, -248);
        assert_eq!(count(&events, "trait_advanced"), 1);
        assert_eq!(count(&events, "career_milestone_recorded"), 1);
        assert_eq!(character.trait_records[0].level, 2);

        let published = events
            .iter()
            .find_map(|event| match event {
                PopulationEvent::CareerMilestoneRecorded(details) => Some(&details.milestone),
                _ => None,
            })
            .unwrap();
        assert_eq!(published.title, "Strategic mastery");
        assert_eq!(published.notes, "Reached level 2");
        assert_eq!(character.career_milestones.last(), Some(published));
    }

    #[test]
    fn tags_without_records_gain_one() {
        let mut character = senator(40);
        character.traits = vec!["Pious".to_owned(), "pious".to_owned(), " ".to_owned()];
        AnnualEvolution::default().evolve(&mut character, -248);
        assert_eq!(character.trait_records.len(), 1);
        assert_eq!(character.trait_records[0].acquired_year, -248);
    }
}
