//! Career goals and ambition intensity.
//!
//! Goals and desired intensity are looked up from the character's social
//! class and age bracket. Actual intensity drifts toward the desired value
//! by a bounded step each year, so ambitions rise and fade gradually.

use civitas_types::{AmbitionProfile, SocialClass};

/// Intensity levels whose upward crossing is written to the history.
pub const INTENSITY_MILESTONES: [u32; 3] = [25, 50, 75];

/// Intensity at which a character fixes a target year.
const TARGET_INTENSITY: u32 = 50;

/// Intensity at or below which a distant target is pulled in.
const SLACK_INTENSITY: u32 = 10;

/// Years between setting a target and the target year.
const TARGET_HORIZON: i32 = 5;

/// Career stage by age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    /// Under 17.
    Youth,
    /// 17 through 29.
    Early,
    /// 30 through 41.
    Middle,
    /// 42 and over.
    Late,
}

impl AgeBracket {
    /// Bracket containing `age`.
    pub const fn of(age: u32) -> Self {
        match age {
            0..=16 => Self::Youth,
            17..=29 => Self::Early,
            30..=41 => Self::Middle,
            _ => Self::Late,
        }
    }
}

/// Goal label and desired intensity for a class at a career stage.
pub const fn career_plan(class: SocialClass, bracket: AgeBracket) -> (&'static str, u32) {
    match (class, bracket) {
        (SocialClass::Patrician, AgeBracket::Youth) => ("Education", 20),
        (SocialClass::Patrician, AgeBracket::Early) => ("Military Tribunate", 55),
        (SocialClass::Patrician, AgeBracket::Middle) => ("Praetorship", 70),
        (SocialClass::Patrician, AgeBracket::Late) => ("Consulship", 80),
        (SocialClass::Plebeian, AgeBracket::Youth) => ("Apprenticeship", 10),
        (SocialClass::Plebeian, AgeBracket::Early) => ("Tribune of the Plebs", 45),
        (SocialClass::Plebeian, AgeBracket::Middle) => ("Plebeian Aedileship", 55),
        (SocialClass::Plebeian, AgeBracket::Late) => ("Senate Seat", 40),
        (SocialClass::Equestrian, AgeBracket::Youth) => ("Education", 15),
        (SocialClass::Equestrian, AgeBracket::Early) => ("Cavalry Command", 40),
        (SocialClass::Equestrian, AgeBracket::Middle) => ("Tax Contracts", 50),
        (SocialClass::Equestrian, AgeBracket::Late) => ("Provincial Prefecture", 35),
    }
}

/// Move `current` toward `desired` by at most `max_step`, then clamp to
/// the legal intensity range.
pub fn step_toward(current: u32, desired: u32, max_step: u32) -> u32 {
    let next = if desired > current {
        current.saturating_add(max_step.min(desired.saturating_sub(current)))
    } else {
        current.saturating_sub(max_step.min(current.saturating_sub(desired)))
    };
    next.min(AmbitionProfile::MAX_INTENSITY)
}

/// Advance a non-retired profile by one year.
///
/// Recomputes the goal, steps intensity toward its desired value, records
/// milestone crossings, and maintains the target year. Retired profiles are
/// left untouched.
pub fn evolve_ambition(
    profile: &mut AmbitionProfile,
    class: SocialClass,
    age: u32,
    year: i32,
    max_step: u32,
) {
    if profile.is_retired {
        profile.goal = AmbitionProfile::RETIRED_GOAL.to_owned();
        return;
    }

    let (goal, desired) = career_plan(class, AgeBracket::of(age));
    if profile.goal != goal {
        if !profile.goal.is_empty() {
            profile.record(year, format!("Turned from {} to {goal}", profile.goal));
        }
        goal.clone_into(&mut profile.goal);
    }

    let before = profile.intensity.min(AmbitionProfile::MAX_INTENSITY);
    let after = step_toward(before, desired, max_step);
    profile.intensity = after;
    for threshold in INTENSITY_MILESTONES {
        if before < threshold && after >= threshold {
            profile.record(year, format!("Ambition intensity reached {threshold}"));
        }
    }

    let has_future_target = profile.target_year.is_some_and(|target| target > year);
    if after >= TARGET_INTENSITY && !has_future_target {
        let target = year.saturating_add(TARGET_HORIZON);
        profile.target_year = Some(target);
        profile.record(year, format!("Set sights on {goal} by {target}"));
    } else if after <= SLACK_INTENSITY {
        let next_year = year.saturating_add(1);
        if profile.target_year.is_some_and(|target| target > next_year) {
            profile.target_year = Some(next_year);
            profile.record(year, format!("Target for {goal} pulled in to {next_year}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_are_disjoint() {
        assert_eq!(AgeBracket::of(16), AgeBracket::Youth);
        assert_eq!(AgeBracket::of(17), AgeBracket::Early);
        assert_eq!(AgeBracket::of(29), AgeBracket::Early);
        assert_eq!(AgeBracket::of(30), AgeBracket::Middle);
        assert_eq!(AgeBracket::of(42), AgeBracket::Late);
    }

    #[test]
    fn intensity_moves_at_most_three_per_year() {
        assert_eq!(step_toward(10, 55, 3), 13);
        assert_eq!(step_toward(54, 55, 3), 55);
        assert_eq!(step_toward(80, 40, 3), 77);
        assert_eq!(step_toward(2, 0, 3), 0);
        assert_eq!(step_toward(250, 100, 3), 100);
    }

    #[test]
    fn crossing_fifty_sets_target_and_history() {
        let mut profile = AmbitionProfile {
            goal: "Military Tribunate".to_owned(),
            intensity: 49,
            ..AmbitionProfile::default()
        };
        evolve_ambition(&mut profile, SocialClass::Patrician, 25, -248, 3);

        assert_eq!(profile.intensity, 52);
        assert_eq!(profile.target_year, Some(-243));
        let notes: Vec<&str> = profile.history.iter().map(|h| h.description.as_str()).collect();
        assert!(notes.contains(&"Ambition intensity reached 50"));
        assert!(notes.iter().any(|note| note.starts_with("Set sights on")));
    }

    #[test]
    fn existing_future_target_is_kept() {
        let mut profile = AmbitionProfile {
            goal: "Consulship".to_owned(),
            intensity: 80,
            target_year: Some(-245),
            ..AmbitionProfile::default()
        };
        evolve_ambition(&mut profile, SocialClass::Patrician, 50, -248, 3);
        assert_eq!(profile.target_year, Some(-245));
        assert!(profile.history.is_empty());
    }

    #[test]
    fn fading_ambition_pulls_target_in() {
        let mut profile = AmbitionProfile {
            goal: "Apprenticeship".to_owned(),
            intensity: 12,
            target_year: Some(-240),
            ..AmbitionProfile::default()
        };
        evolve_ambition(&mut profile, SocialClass::Plebeian, 12, -248, 3);
        assert_eq!(profile.intensity, 10);
        assert_eq!(profile.target_year, Some(-247));
    }

    #[test]
    fn retired_profiles_do_not_evolve() {
        let mut profile = AmbitionProfile {
            goal: "Retired".to_owned(),
            is_retired: true,
            ..AmbitionProfile::default()
        };
        evolve_ambition(&mut profile, SocialClass::Patrician, 30, -248, 3);
        assert_eq!(profile.intensity, 0);
        assert_eq!(profile.goal, "Retired");
    }
}
