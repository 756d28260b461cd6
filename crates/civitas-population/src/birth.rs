//! Births among married couples.
//!
//! Every living married woman inside the fertile window whose husband is
//! alive rolls once per day against a daily probability derived from the
//! configured yearly birth rate. Newborns inherit family, branch, and class
//! from the father (the mother when the father is unknown) and are named by
//! the naming rules in the generation context.

use rand::Rng;

use civitas_types::{
    Character, CharacterBornDetails, CharacterId, Gender, PoliticalStats, SimDate, TraitRecord,
};

use crate::config::BirthConfig;
use crate::error::PopulationError;
use crate::family::FamilyLookup;
use crate::mortality::yearly_to_daily;
use crate::naming::{GenerationContext, IdAllocator, NamingRules};
use crate::repository::CharacterRepository;
use crate::rng::{RngState, SeededRng};

/// Parents of a newborn, resolved from the repository.
#[derive(Debug, Clone, Copy)]
pub struct Parents<'a> {
    /// The father, when known.
    pub father: Option<&'a Character>,
    /// The mother.
    pub mother: &'a Character,
}

/// Create a newborn from its parents.
///
/// Draws the child's ID, gender, name, and starting trait from `context`.
pub fn spawn_child(
    context: &mut GenerationContext<'_>,
    parents: Parents<'_>,
    sibling: Option<CharacterId>,
    date: SimDate,
) -> Result<Character, PopulationError> {
    let id = context.ids.allocate()?;
    let gender = if context.rng.random_bool(0.5) {
        Gender::Male
    } else {
        Gender::Female
    };
    let lead = parents.father.unwrap_or(parents.mother);
    let name = context.naming.name_child(
        &lead.family,
        parents.father.map(|father| &father.name),
        gender,
        &mut *context.rng,
    );

    let mut child = Character::new(id, name, &lead.family, lead.social_class, date, 0);
    child.branch.clone_from(&lead.branch);
    child.father_id = parents.father.map(|father| father.id);
    child.mother_id = Some(parents.mother.id);
    child.sibling_id = sibling;
    child.faction = lead.faction;
    child.stats = inherited_stats(parents.father.map(|father| &father.stats), &parents.mother.stats);

    let tag = context.random_trait();
    child.traits.push(tag.to_owned());
    child.trait_records.push(TraitRecord::new(tag, date.year));
    Ok(child)
}

/// Midpoint of the parents' attributes, or the mother's alone.
fn inherited_stats(father: Option<&PoliticalStats>, mother: &PoliticalStats) -> PoliticalStats {
    let mother = mother.clamped();
    let Some(father) = father.map(PoliticalStats::clamped) else {
        return mother;
    };
    // Both operands are clamped to [0, 20], so the sum cannot overflow.
    let mid = |a: i32, b: i32| a.saturating_add(b) / 2;
    PoliticalStats {
        oratory: mid(father.oratory, mother.oratory),
        ambition: mid(father.ambition, mother.ambition),
        courage: mid(father.courage, mother.courage),
        dignitas: mid(father.dignitas, mother.dignitas),
        administration: mid(father.administration, mother.administration),
        judgment: mid(father.judgment, mother.judgment),
        strategy: mid(father.strategy, mother.strategy),
        civic: mid(father.civic, mother.civic),
    }
}

fn is_fertile(config: &BirthConfig, mother: &Character, husband: Option<&Character>) -> bool {
    mother.is_alive
        && mother.gender == Gender::Female
        && (config.min_mother_age..=config.max_mother_age).contains(&mother.age)
        && husband.is_some_and(|husband| husband.is_alive)
}

/// Rolls daily births and adds newborns to the repository.
#[derive(Debug, Clone)]
pub struct BirthService {
    config: BirthConfig,
    daily_probability: f64,
    rng: SeededRng,
}

impl BirthService {
    /// Create a service owning `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::InvalidConfig`] for an out-of-range
    /// probability or an inverted fertile window.
    pub fn new(config: BirthConfig, rng: SeededRng) -> Result<Self, PopulationError> {
        config.validate()?;
        let daily_probability = yearly_to_daily(config.yearly_probability);
        Ok(Self {
            config,
            daily_probability,
            rng,
        })
    }

    /// Whether `mother` can conceive today given her husband's record.
    pub fn is_eligible(&self, mother: &Character, husband: Option<&Character>) -> bool {
        is_fertile(&self.config, mother, husband)
    }

    /// Roll today's births and insert the newborns.
    ///
    /// Returns one record per birth, in the mothers' ID order.
    pub fn run_daily(
        &mut self,
        repository: &mut CharacterRepository,
        ids: &mut IdAllocator,
        naming: &dyn NamingRules,
        date: SimDate,
    ) -> Result<Vec<CharacterBornDetails>, PopulationError> {
        if !self.config.enabled {
            return Ok(Vec::new());
        }

        let mut newborns = Vec::new();
        {
            let family = FamilyLookup::new(repository);
            let mut context = GenerationContext {
                ids,
                rng: &mut self.rng,
                naming,
            };
            for mother in repository.get_all_living() {
                if mother.gender != Gender::Female {
                    continue;
                }
                let husband = family.spouse_of(mother.id);
                if !is_fertile(&self.config, mother, husband) {
                    continue;
                }
                let roll: f64 = context.rng.random();
                if roll >= self.daily_probability {
                    continue;
                }
                let sibling = family.youngest_living_child(mother.id).map(|child| child.id);
                let parents = Parents {
                    father: husband,
                    mother,
                };
                let child = spawn_child(&mut context, parents, sibling, date)?;
                newborns.push((mother.id, child));
            }
        }

        let mut born = Vec::with_capacity(newborns.len());
        for (mother, child) in newborns {
            let name = child.full_name();
            tracing::debug!(id = %child.id, %name, "Child born");
            born.push(CharacterBornDetails {
                child: child.id,
                father: child.father_id,
                mother,
                name,
                date,
            });
            repository.add(child, true);
        }
        Ok(born)
    }

    /// Daily birth probability in use.
    pub const fn daily_probability(&self) -> f64 {
        self.daily_probability
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
    use civitas_types::{RomanName, SocialClass};

    use super::*;
    use crate::naming::RomanNamingRules;

    fn couple(repo: &mut CharacterRepository, wife_age: u32) {
        let birth = SimDate::new(-280, 1, 10).unwrap();
        let mut husband = Character::new(
            CharacterId::new(1),
            RomanName::new(Some("Servius"), "Sulpicius", Some("Galba"), Gender::Male),
            "Sulpicius",
            SocialClass::Plebeian,
            birth,
            32,
        );
        husband.branch = Some("Galba".to_owned());
        husband.stats = PoliticalStats::uniform(12);
        let mut wife = Character::new(
            CharacterId::new(2),
            RomanName::new(None, "Sulpicia", Some("Galba"), Gender::Female),
            "Sulpicius",
            SocialClass::Plebeian,
            birth,
            wife_age,
        );
        wife.stats = PoliticalStats::uniform(7);
        husband.spouse_id = Some(wife.id);
        wife.spouse_id = Some(husband.id);
        repo.add(husband, true);
        repo.add(wife, true);
    }

    fn certain() -> BirthConfig {
        BirthConfig {
            yearly_probability: 1.0,
            ..BirthConfig::default()
        }
    }

    #[test]
    fn newborn_inherits_from_father() {
        let mut repo = CharacterRepository::new();
        couple(&mut repo, 25);
        let mut ids = IdAllocator::starting_at(CharacterId::new(3));
        let mut service = BirthService::new(certain(), SeededRng::from_seed(4)).unwrap();
        let date = SimDate::new(-248, 5, 5).unwrap();

        let born = service
            .run_daily(&mut repo, &mut ids, &RomanNamingRules, date)
            .unwrap();
        assert_eq!(born.len(), 1);

        let child = repo.get(CharacterId::new(3)).unwrap();
        assert_eq!(child.family, "Sulpicius");
        assert_eq!(child.branch.as_deref(), Some("Galba"));
        assert_eq!(child.social_class, SocialClass::Plebeian);
        assert_eq!(child.father_id, Some(CharacterId::new(1)));
        assert_eq!(child.mother_id, Some(CharacterId::new(2)));
        assert_eq!(child.age, 0);
        assert_eq!(child.stats.oratory, 9);
        assert_eq!(child.trait_records.len(), 1);
        assert_eq!(ids.peek(), CharacterId::new(4));
    }

    #[test]
    fn second_child_links_older_sibling() {
        let mut repo = CharacterRepository::new();
        couple(&mut repo, 25);
        let mut ids = IdAllocator::starting_at(CharacterId::new(3));
        let mut service = BirthService::new(certain(), SeededRng::from_seed(4)).unwrap();
        let first = SimDate::new(-248, 5, 5).unwrap();
        let second = SimDate::new(-247, 5, 5).unwrap();
        service.run_daily(&mut repo, &mut ids, &RomanNamingRules, first).unwrap();
        service.run_daily(&mut repo, &mut ids, &RomanNamingRules, second).unwrap();

        let younger = repo.get(CharacterId::new(4)).unwrap();
        assert_eq!(younger.sibling_id, Some(CharacterId::new(3)));
    }

    #[test]
    fn outside_window_or_widowed_has_no_births() {
        let mut repo = CharacterRepository::new();
        couple(&mut repo, 50);
        let mut ids = IdAllocator::starting_at(CharacterId::new(3));
        let mut service = BirthService::new(certain(), SeededRng::from_seed(4)).unwrap();
        let date = SimDate::new(-248, 5, 5).unwrap();
        assert!(service.run_daily(&mut repo, &mut ids, &RomanNamingRules, date).unwrap().is_empty());

        let mut repo = CharacterRepository::new();
        couple(&mut repo, 25);
        repo.mark_dead(CharacterId::new(1), true);
        assert!(service.run_daily(&mut repo, &mut ids, &RomanNamingRules, date).unwrap().is_empty());
    }
}
