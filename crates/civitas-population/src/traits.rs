//! Trait experience and level-up mechanics.
//!
//! Each year every trait record earns experience. When accumulated
//! experience meets the threshold for the current level, the record levels
//! up and the excess carries into the next level.

use civitas_types::{Character, TraitRecord};

/// Base experience every record earns per year.
const BASE_GAIN: f64 = 2.0;

/// Divisor turning ambition intensity into bonus experience.
const INTENSITY_DIVISOR: f64 = 25.0;

/// Bonus for records still at level 1.
const NOVICE_BONUS: f64 = 0.5;

/// Bonus for characters under [`YOUTH_AGE`].
const YOUTH_BONUS: f64 = 0.5;

/// Age below which the youth bonus applies.
const YOUTH_AGE: u32 = 30;

/// A level gained by one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitAdvance {
    /// Trait tag.
    pub tag: String,
    /// Level before.
    pub from_level: u32,
    /// Level after.
    pub to_level: u32,
}

/// Experience needed to leave `level`: `10 + 5 * level`.
pub fn level_threshold(level: u32) -> f64 {
    10.0 + 5.0 * f64::from(level)
}

/// Yearly experience for `record`.
pub fn annual_gain(record: &TraitRecord, intensity: u32, is_retired: bool, age: u32) -> f64 {
    let mut gain = BASE_GAIN;
    if !is_retired {
        gain += f64::from(intensity) / INTENSITY_DIVISOR;
    }
    if record.level <= 1 {
        gain += NOVICE_BONUS;
    }
    if age < YOUTH_AGE {
        gain += YOUTH_BONUS;
    }
    gain
}

/// Add `gain` to a record, levelling up as many times as thresholds allow.
///
/// Returns the level range crossed, or `None` when the level is unchanged.
pub fn grow(record: &mut TraitRecord, gain: f64) -> Option<(u32, u32)> {
    if !record.experience.is_finite() || record.experience < 0.0 {
        record.experience = 0.0;
    }
    record.level = record.level.max(1);
    if gain.is_finite() && gain > 0.0 {
        record.experience += gain;
    }

    let from = record.level;
    loop {
        let threshold = level_threshold(record.level);
        if record.experience < threshold {
            break;
        }
        let Some(next) = record.level.checked_add(1) else {
            break;
        };
        record.experience -= threshold;
        record.level = next;
    }
    (record.level > from).then_some((from, record.level))
}

/// Make sure every free-form trait tag has a record, acquired in `year`.
pub fn ensure_records(character: &mut Character, year: i32) {
    for tag in &character.traits {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        let known = character
            .trait_records
            .iter()
            .any(|record| record.tag.eq_ignore_ascii_case(tag));
        if !known {
            character.trait_records.push(TraitRecord::new(tag, year));
        }
    }
}

/// Grow every trait record of `character` for one year.
///
/// Records are processed in case-insensitive tag order so the outcome does
/// not depend on insertion order.
pub fn grow_traits(character: &mut Character) -> Vec<TraitAdvance> {
    let intensity = character.ambition.intensity;
    let is_retired = character.ambition.is_retired;
    let age = character.age;

    let mut order: Vec<usize> = (0..character.trait_records.len()).collect();
    order.sort_by_cached_key(|&index| {
        character
            .trait_records
            .get(index)
            .map(|record| record.tag.to_lowercase())
            .unwrap_or_default()
    });

    let mut advances = Vec::new();
    for index in order {
        let Some(record) = character.trait_records.get_mut(index) else {
            continue;
        };
        let gain = annual_gain(record, intensity, is_retired, age);
        if let Some((from_level, to_level)) = grow(record, gain) {
            advances.push(TraitAdvance {
                tag: record.tag.clone(),
                from_level,
                to_level,
            });
        }
    }
    advances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: u32, experience: f64) -> TraitRecord {
        TraitRecord {
            tag: "Disciplined".to_owned(),
            level,
            experience,
            acquired_year: -260,
        }
    }

    #[test]
    fn thresholds_grow_by_five() {
        assert!((level_threshold(1) - 15.0).abs() < f64::EPSILON);
        assert!((level_threshold(2) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn levels_exactly_at_threshold_with_nothing_carried() {
        let mut trait_record = record(1, 11.0);
        assert_eq!(grow(&mut trait_record, 2.0), None);
        assert!((trait_record.experience - 13.0).abs() < 1e-12);

        assert_eq!(grow(&mut trait_record, 2.0), Some((1, 2)));
        assert_eq!(trait_record.level, 2);
        assert!(trait_record.experience.abs() < 1e-12);
    }

    #[test]
    fn below_threshold_after_two_years_stays_put() {
        let mut trait_record = record(1, 9.5);
        assert_eq!(grow(&mut trait_record, 2.0), None);
        assert_eq!(grow(&mut trait_record, 2.0), None);
        assert!((trait_record.experience - 13.5).abs() < 1e-12);
    }

    #[test]
    fn excess_carries_over_multiple_levels() {
        let mut trait_record = record(1, 0.0);
        assert_eq!(grow(&mut trait_record, 40.0), Some((1, 3)));
        assert!((trait_record.experience - 5.0).abs() < 1e-12);
    }

    #[test]
    fn malformed_records_are_repaired_before_growth() {
        let mut trait_record = record(0, f64::NAN);
        assert_eq!(grow(&mut trait_record, 1.0), None);
        assert_eq!(trait_record.level, 1);
        assert!((trait_record.experience - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gain_components_add_up() {
        let novice = record(1, 0.0);
        assert!((annual_gain(&novice, 50, false, 25) - 5.0).abs() < 1e-12);
        assert!((annual_gain(&novice, 50, true, 25) - 3.0).abs() < 1e-12);
        let veteran = record(3, 0.0);
        assert!((annual_gain(&veteran, 0, false, 60) - 2.0).abs() < 1e-12);
    }
}
