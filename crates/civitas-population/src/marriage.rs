//! Daily probabilistic pairing of eligible singles.
//!
//! Each day the unmarried adults are split into male and female pools. Up
//! to `daily_matchmaking_cap` attempts are made: a man is picked uniformly,
//! a woman is picked by class-weighted lottery, and the pair marries with
//! `match_probability`. A failed roll leaves both in their pools. With
//! `forbid_close_kin` set, siblings and parent-child pairs weigh zero.

use rand::Rng;

use civitas_types::{Character, CharacterId, Gender, MarriagePair, SocialClass};

use crate::config::MarriageConfig;
use crate::error::PopulationError;
use crate::repository::CharacterRepository;
use crate::rng::{RngState, SeededRng};

/// Pick an index by weight.
///
/// Non-finite and negative weights count as zero. When every weight is
/// zero the pick is uniform. Otherwise a value is drawn in `[0, total)` and
/// the first positive-weight candidate whose cumulative weight meets or
/// exceeds it is chosen. Returns `None` for an empty slice.
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let clean = |weight: f64| {
        if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        }
    };
    let total: f64 = weights.iter().copied().map(clean).sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(rng.random_range(0..weights.len()));
    }

    let draw = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (index, weight) in weights.iter().copied().map(clean).enumerate() {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = Some(index);
        if cumulative >= draw {
            return Some(index);
        }
    }
    last_positive
}

/// An eligible single and the kinship links needed to rule out relatives.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: CharacterId,
    class: SocialClass,
    father: Option<CharacterId>,
    mother: Option<CharacterId>,
    sibling: Option<CharacterId>,
}

impl Candidate {
    const fn of(character: &Character) -> Self {
        Self {
            id: character.id,
            class: character.social_class,
            father: character.father_id,
            mother: character.mother_id,
            sibling: character.sibling_id,
        }
    }

    fn is_kin(&self, other: &Self) -> bool {
        let shares = |a: Option<CharacterId>, b: Option<CharacterId>| a.is_some() && a == b;
        shares(self.father, other.father)
            || shares(self.mother, other.mother)
            || self.father == Some(other.id)
            || self.mother == Some(other.id)
            || other.father == Some(self.id)
            || other.mother == Some(self.id)
            || self.sibling == Some(other.id)
            || other.sibling == Some(self.id)
    }
}

/// Pairs eligible singles each simulated day.
#[derive(Debug, Clone)]
pub struct MarriageService {
    config: MarriageConfig,
    rng: SeededRng,
}

impl MarriageService {
    /// Create a service owning `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::InvalidConfig`] for out-of-range
    /// probabilities or weights.
    pub fn new(config: MarriageConfig, rng: SeededRng) -> Result<Self, PopulationError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    /// Whether `character` may enter today's pools.
    pub fn is_eligible(&self, character: &Character) -> bool {
        let min_age = match character.gender {
            Gender::Male => self.config.min_age_male,
            Gender::Female => self.config.min_age_female,
        };
        character.is_alive && character.spouse_id.is_none() && character.age >= min_age
    }

    /// Run one day of matchmaking, committing marriages to the repository.
    ///
    /// Returns the couples married today in commit order.
    pub fn run_daily(
        &mut self,
        repository: &mut CharacterRepository,
    ) -> Result<Vec<MarriagePair>, PopulationError> {
        let (mut men, mut women): (Vec<Candidate>, Vec<Candidate>) = {
            let eligible = repository
                .get_all_living()
                .into_iter()
                .filter(|character| self.is_eligible(character));
            let mut men = Vec::new();
            let mut women = Vec::new();
            for character in eligible {
                match character.gender {
                    Gender::Male => men.push(Candidate::of(character)),
                    Gender::Female => women.push(Candidate::of(character)),
                }
            }
            (men, women)
        };

        let mut married = Vec::new();
        for _ in 0..self.config.daily_matchmaking_cap {
            if men.is_empty() || women.is_empty() {
                break;
            }
            let man_index = self.rng.random_range(0..men.len());
            let Some(man) = men.get(man_index).copied() else {
                break;
            };
            let weights: Vec<f64> = women
                .iter()
                .map(|woman| self.preference_weight(&man, woman))
                .collect();
            let Some(woman_index) = weighted_index(&weights, &mut self.rng) else {
                break;
            };
            let Some(woman) = women.get(woman_index).copied() else {
                break;
            };

            // The uniform fallback can land on an incompatible partner.
            if !self.is_compatible(&man, &woman) {
                continue;
            }
            let roll: f64 = self.rng.random();
            if roll >= self.config.match_probability {
                continue;
            }

            repository.modify(man.id, |character| character.spouse_id = Some(woman.id))?;
            repository.modify(woman.id, |character| character.spouse_id = Some(man.id))?;
            men.remove(man_index);
            women.remove(woman_index);
            tracing::debug!(husband = %man.id, wife = %woman.id, "Marriage committed");
            married.push(MarriagePair {
                husband: man.id,
                wife: woman.id,
            });
        }
        Ok(married)
    }

    fn is_compatible(&self, man: &Candidate, woman: &Candidate) -> bool {
        let class_ok = self.config.allow_cross_class || man.class == woman.class;
        class_ok && !(self.config.forbid_close_kin && man.is_kin(woman))
    }

    fn preference_weight(&self, man: &Candidate, woman: &Candidate) -> f64 {
        if !self.is_compatible(man, woman) {
            0.0
        } else if man.class == woman.class {
            self.config.same_class_weight
        } else {
            1.0
        }
    }

    /// Position of the owned random source.
    pub fn rng_state(&self) -> RngState {
        self.rng.state()
    }

    /// Replace the random source, e.g. when resuming a saved run.
    pub fn restore_rng(&mut self, state: RngState) {
        self.rng = SeededRng::restore(state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civitas_types::{RomanName, SimDate};

    use super::*;

    fn single(id: u64, gender: Gender, class: SocialClass, age: u32) -> Character {
        let name = RomanName::new(None, "Fulvius", None, gender);
        let birth = SimDate::new(-270, 2, 2).unwrap();
        Character::new(CharacterId::new(id), name, "Fulvius", class, birth, age)
    }

    fn certain(cap: u32) -> MarriageConfig {
        MarriageConfig {
            daily_matchmaking_cap: cap,
            match_probability: 1.0,
            ..MarriageConfig::default()
        }
    }

    #[test]
    fn weighted_index_respects_zero_weights() {
        let mut rng = SeededRng::from_seed(3);
        for _ in 0..200 {
            let pick = weighted_index(&[0.0, 2.0, 0.0, 1.0], &mut rng).unwrap();
            assert!(pick == 1 || pick == 3);
        }
        assert_eq!(weighted_index(&[], &mut rng), None);
        let fallback = weighted_index(&[0.0, f64::NAN, -1.0], &mut rng).unwrap();
        assert!(fallback < 3);
    }

    #[test]
    fn cap_limits_marriages_per_day() {
        let mut repo = CharacterRepository::new();
        repo.add(single(1, Gender::Male, SocialClass::Plebeian, 20), true);
        repo.add(single(2, Gender::Female, SocialClass::Plebeian, 18), true);
        repo.add(single(3, Gender::Male, SocialClass::Plebeian, 22), true);
        repo.add(single(4, Gender::Female, SocialClass::Plebeian, 19), true);

        let mut service = MarriageService::new(certain(1), SeededRng::from_seed(5)).unwrap();
        let first = service.run_daily(&mut repo).unwrap();
        assert_eq!(first.len(), 1);
        let second = service.run_daily(&mut repo).unwrap();
        assert_eq!(second.len(), 1);
        assert!(service.run_daily(&mut repo).unwrap().is_empty());

        for pair in first.iter().chain(&second) {
            assert_eq!(repo.get(pair.husband).unwrap().spouse_id, Some(pair.wife));
            assert_eq!(repo.get(pair.wife).unwrap().spouse_id, Some(pair.husband));
        }
    }

    #[test]
    fn underage_and_married_are_ineligible() {
        let mut repo = CharacterRepository::new();
        repo.add(single(1, Gender::Male, SocialClass::Plebeian, 15), true);
        repo.add(single(2, Gender::Female, SocialClass::Plebeian, 18), true);
        let mut wed = single(3, Gender::Male, SocialClass::Plebeian, 30);
        wed.spouse_id = Some(CharacterId::new(99));
        repo.add(wed, true);

        let mut service = MarriageService::new(certain(5), SeededRng::from_seed(5)).unwrap();
        assert!(service.run_daily(&mut repo).unwrap().is_empty());
    }

    #[test]
    fn cross_class_blocked_when_disallowed() {
        let mut repo = CharacterRepository::new();
        repo.add(single(1, Gender::Male, SocialClass::Patrician, 25), true);
        repo.add(single(2, Gender::Female, SocialClass::Plebeian, 20), true);
        let config = MarriageConfig {
            allow_cross_class: false,
            ..certain(10)
        };
        let mut service = MarriageService::new(config, SeededRng::from_seed(11)).unwrap();
        for _ in 0..20 {
            assert!(service.run_daily(&mut repo).unwrap().is_empty());
        }
    }

    #[test]
    fn siblings_never_marry() {
        let mut repo = CharacterRepository::new();
        let mut brother = single(1, Gender::Male, SocialClass::Plebeian, 25);
        let mut sister = single(2, Gender::Female, SocialClass::Plebeian, 20);
        brother.father_id = Some(CharacterId::new(50));
        sister.father_id = Some(CharacterId::new(50));
        repo.add(brother, true);
        repo.add(sister, true);

        let mut service = MarriageService::new(certain(10), SeededRng::from_seed(2)).unwrap();
        for _ in 0..20 {
            assert!(service.run_daily(&mut repo).unwrap().is_empty());
        }
    }

    #[test]
    fn kin_rule_can_be_switched_off() {
        let mut repo = CharacterRepository::new();
        let mut brother = single(1, Gender::Male, SocialClass::Plebeian, 25);
        let mut sister = single(2, Gender::Female, SocialClass::Plebeian, 20);
        brother.mother_id = Some(CharacterId::new(51));
        sister.mother_id = Some(CharacterId::new(51));
        sister.sibling_id = Some(CharacterId::new(1));
        repo.add(brother, true);
        repo.add(sister, true);

        let config = MarriageConfig {
            forbid_close_kin: false,
            ..certain(1)
        };
        let mut service = MarriageService::new(config, SeededRng::from_seed(2)).unwrap();
        let married = service.run_daily(&mut repo).unwrap();
        assert_eq!(
            married,
            vec![MarriagePair {
                husband: CharacterId::new(1),
                wife: CharacterId::new(2),
            }]
        );
    }

    #[test]
    fn parent_and_child_never_marry() {
        let mut repo = CharacterRepository::new();
        let father = single(1, Gender::Male, SocialClass::Plebeian, 45);
        let mut daughter = single(2, Gender::Female, SocialClass::Plebeian, 20);
        daughter.father_id = Some(CharacterId::new(1));
        repo.add(father, true);
        repo.add(daughter, true);

        let mut service = MarriageService::new(certain(10), SeededRng::from_seed(4)).unwrap();
        for _ in 0..20 {
            assert!(service.run_daily(&mut repo).unwrap().is_empty());
        }
    }

    #[test]
    fn zero_probability_never_commits() {
        let mut repo = CharacterRepository::new();
        repo.add(single(1, Gender::Male, SocialClass::Plebeian, 25), true);
        repo.add(single(2, Gender::Female, SocialClass::Plebeian, 20), true);
        let config = MarriageConfig {
            match_probability: 0.0,
            ..certain(3)
        };
        let mut service = MarriageService::new(config, SeededRng::from_seed(2)).unwrap();
        assert!(service.run_daily(&mut repo).unwrap().is_empty());
        assert!(repo.get(CharacterId::new(1)).unwrap().spouse_id.is_none());
    }
}
