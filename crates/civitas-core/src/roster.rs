//! The built-in founding families and derived political fields.
//!
//! The roster describes the leading patrician and plebeian houses of
//! 248 BCE as households: a husband and wife, their sons, and their
//! daughters. [`builtin_roster`] turns it into linked characters with
//! sequential IDs, and [`derive_political_fields`] fills in influence
//! pools, attributes, and faction from class, wealth, influence, and traits.

use serde::Deserialize;

use civitas_population::{IdAllocator, PopulationError, RomanNamingRules};
use civitas_types::{
    Character, CharacterId, Gender, InfluencePools, PoliticalStats, RomanName, SimDate,
    SocialClass,
};

/// Household data for the founding families.
const FAMILIES_JSON: &str = include_str!("../data/families.json");

/// Men of the roster were born on this month and day.
const MALE_BIRTHDAY: (u32, u32) = (3, 12);

/// Women of the roster were born on this month and day.
const FEMALE_BIRTHDAY: (u32, u32) = (7, 6);

/// Attribute baseline for adults.
const ADULT_BASE: i32 = 6;

/// Attribute baseline for children.
const CHILD_BASE: i32 = 3;

/// Age from which the adult baseline applies.
const ADULT_AGE: u32 = 16;

/// Attribute bonus for each matching trait.
const TRAIT_BONUS: i32 = 4;

/// Military influence granted per martial trait.
const MARTIAL_TRAIT_INFLUENCE: f64 = 2.0;

/// Denarii per point of family influence.
const WEALTH_PER_FAMILY_POINT: f64 = 1000.0;

/// Errors that can occur while building the built-in roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The embedded household data did not parse.
    #[error("failed to parse built-in roster: {source}")]
    Parse {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Identifier allocation failed.
    #[error("failed to allocate roster identifiers: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: PopulationError,
    },
}

#[derive(Debug, Deserialize)]
struct HouseholdRecord {
    family: String,
    branch: String,
    class: SocialClass,
    husband: MemberRecord,
    wife: MemberRecord,
    #[serde(default)]
    sons: Vec<MemberRecord>,
    #[serde(default)]
    daughters: Vec<MemberRecord>,
}

#[derive(Debug, Deserialize)]
struct MemberRecord {
    #[serde(default)]
    praenomen: Option<String>,
    #[serde(default)]
    nomen: Option<String>,
    #[serde(default)]
    cognomen: Option<String>,
    birth: i32,
    #[serde(default)]
    traits: Vec<String>,
    #[serde(default)]
    wealth: u64,
    #[serde(default)]
    influence: u32,
}

/// Number of households in the built-in roster.
///
/// # Errors
///
/// Returns [`RosterError::Parse`] if the embedded data is malformed.
pub fn household_count() -> Result<usize, RosterError> {
    let households: Vec<HouseholdRecord> = serde_json::from_str(FAMILIES_JSON)?;
    Ok(households.len())
}

/// Build the founding population as it stood at the start of `start_year`.
///
/// IDs are drawn from `ids` household by household: husband, wife, sons,
/// then daughters. Each child links to the next-older sibling.
///
/// # Errors
///
/// Returns [`RosterError`] if the embedded data is malformed or the ID
/// space is exhausted.
pub fn builtin_roster(start_year: i32, ids: &mut IdAllocator) -> Result<Vec<Character>, RosterError> {
    let households: Vec<HouseholdRecord> = serde_json::from_str(FAMILIES_JSON)?;
    let mut characters = Vec::new();
    for household in &households {
        build_household(household, start_year, ids, &mut characters)?;
    }
    tracing::debug!(
        households = households.len(),
        characters = characters.len(),
        "Built-in roster assembled"
    );
    Ok(characters)
}

fn build_household(
    household: &HouseholdRecord,
    start_year: i32,
    ids: &mut IdAllocator,
    out: &mut Vec<Character>,
) -> Result<(), RosterError> {
    let family = RomanNamingRules::masculinize_nomen(&household.family);
    let feminine = RomanNamingRules::feminize(&family);
    let member = |id: CharacterId, record: &MemberRecord, name: RomanName| {
        let gender = name.gender;
        let (month, day) = match gender {
            Gender::Male => MALE_BIRTHDAY,
            Gender::Female => FEMALE_BIRTHDAY,
        };
        let birth = SimDate {
            year: record.birth,
            month,
            day,
        };
        let age = u32::try_from(start_year.saturating_sub(record.birth)).unwrap_or(0);
        let mut character =
            Character::new(id, name, &family, household.class, birth, age);
        character.branch = Some(household.branch.clone());
        character.traits.clone_from(&record.traits);
        character.wealth = record.wealth;
        character.influence = record.influence;
        derive_political_fields(&mut character);
        character
    };

    let husband_id = ids.allocate()?;
    let wife_id = ids.allocate()?;

    let husband_name = RomanName::new(
        household.husband.praenomen.as_deref(),
        &family,
        household.husband.cognomen.as_deref(),
        Gender::Male,
    );
    let mut husband = member(husband_id, &household.husband, husband_name);
    husband.spouse_id = Some(wife_id);

    let wife_nomen = household.wife.nomen.clone().unwrap_or_else(|| feminine.clone());
    let wife_name = RomanName::new(
        None,
        &wife_nomen,
        household.wife.cognomen.as_deref(),
        Gender::Female,
    );
    let mut wife = member(wife_id, &household.wife, wife_name);
    wife.spouse_id = Some(husband_id);

    out.push(husband);
    out.push(wife);

    let children = household
        .sons
        .iter()
        .map(|record| (record, Gender::Male))
        .chain(household.daughters.iter().map(|record| (record, Gender::Female)));
    let mut older: Option<CharacterId> = None;
    for (record, gender) in children {
        let id = ids.allocate()?;
        let name = match gender {
            Gender::Male => RomanName::new(
                record.praenomen.as_deref(),
                &family,
                record.cognomen.as_deref(),
                Gender::Male,
            ),
            Gender::Female => RomanName::new(None, &feminine, record.cognomen.as_deref(), Gender::Female),
        };
        let mut child = member(id, record, name);
        child.father_id = Some(husband_id);
        child.mother_id = Some(wife_id);
        child.sibling_id = older;
        older = Some(id);
        out.push(child);
    }
    Ok(())
}

/// The attribute a trait tag feeds.
#[derive(Debug, Clone, Copy)]
enum Attribute {
    Oratory,
    Ambition,
    Courage,
    Dignitas,
    Administration,
    Judgment,
    Strategy,
    Civic,
}

impl Attribute {
    fn of(tag: &str) -> Option<Self> {
        let attribute = match tag.trim().to_ascii_lowercase().as_str() {
            "eloquent" | "persuasive" | "charismatic" | "charming" | "diplomatic" => Self::Oratory,
            "ambitious" | "determined" | "energetic" | "innovative" => Self::Ambition,
            "bold" | "brave" | "courageous" | "adventurous" | "resilient" => Self::Courage,
            "proud" | "dignified" | "elegant" | "cultured" | "graceful" => Self::Dignitas,
            "organized" | "orderly" | "meticulous" | "diligent" | "disciplined" => {
                Self::Administration
            }
            "prudent" | "wise" | "analytical" | "astute" | "shrewd" | "insightful"
            | "perceptive" | "calculating" | "observant" | "thoughtful" => Self::Judgment,
            "strategic" | "naval" | "vigilant" | "alert" | "cautious" => Self::Strategy,
            "pious" | "devout" | "dutiful" | "loyal" | "virtuous" | "steadfast" | "kind"
            | "supportive" | "helpful" => Self::Civic,
            _ => return None,
        };
        Some(attribute)
    }

    const fn slot(self, stats: &mut PoliticalStats) -> &mut i32 {
        match self {
            Self::Oratory => &mut stats.oratory,
            Self::Ambition => &mut stats.ambition,
            Self::Courage => &mut stats.courage,
            Self::Dignitas => &mut stats.dignitas,
            Self::Administration => &mut stats.administration,
            Self::Judgment => &mut stats.judgment,
            Self::Strategy => &mut stats.strategy,
            Self::Civic => &mut stats.civic,
        }
    }
}

/// Whether a trait tag adds to military influence.
fn is_martial(tag: &str) -> bool {
    matches!(
        tag.trim().to_ascii_lowercase().as_str(),
        "strategic" | "naval" | "bold" | "brave" | "courageous" | "disciplined" | "vigilant"
    )
}

/// Fill in influence pools, attributes, and faction for a roster member.
///
/// Deterministic in the character's class, age, wealth, influence, and
/// traits. The faction is the primary affinity of the resulting profile.
pub fn derive_political_fields(character: &mut Character) {
    let influence = f64::from(character.influence);
    let martial = character.traits.iter().filter(|tag| is_martial(tag)).count();
    #[allow(clippy::cast_precision_loss)]
    let martial = martial as f64;
    #[allow(clippy::cast_precision_loss)]
    let wealth = character.wealth as f64;

    let (senate_weight, popular_weight, military_weight) = match character.social_class {
        SocialClass::Patrician => (3.0, 1.0, 0.5),
        SocialClass::Plebeian => (1.0, 3.0, 0.5),
        SocialClass::Equestrian => (1.5, 1.5, 1.5),
    };
    character.pools = InfluencePools {
        senatorial: influence * senate_weight,
        popular: influence * popular_weight,
        military: influence.mul_add(military_weight, martial * MARTIAL_TRAIT_INFLUENCE),
        family: wealth / WEALTH_PER_FAMILY_POINT,
    };

    let base = if character.age >= ADULT_AGE {
        ADULT_BASE
    } else {
        CHILD_BASE
    };
    let mut stats = PoliticalStats::uniform(base);
    match character.social_class {
        SocialClass::Patrician => {
            stats.dignitas = stats.dignitas.saturating_add(4);
            stats.civic = stats.civic.saturating_add(1);
        }
        SocialClass::Plebeian => {
            stats.civic = stats.civic.saturating_add(2);
            stats.oratory = stats.oratory.saturating_add(1);
        }
        SocialClass::Equestrian => {
            stats.administration = stats.administration.saturating_add(3);
            stats.strategy = stats.strategy.saturating_add(1);
        }
    }
    let standing = i32::try_from(character.influence / 2).unwrap_or(PoliticalStats::MAX);
    stats.dignitas = stats.dignitas.saturating_add(standing);
    stats.ambition = stats.ambition.saturating_add(standing);
    for tag in &character.traits {
        if let Some(attribute) = Attribute::of(tag) {
            let value = attribute.slot(&mut stats);
            *value = value.saturating_add(TRAIT_BONUS);
        }
    }
    character.stats = stats.clamped();
    character.faction = civitas_politics::assess(character).affinity.primary();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeSet;

    use civitas_types::Faction;

    use super::*;

    fn roster() -> Vec<Character> {
        let mut ids = IdAllocator::default();
        builtin_roster(-248, &mut ids).unwrap()
    }

    #[test]
    fn every_household_has_six_members() {
        let characters = roster();
        assert_eq!(characters.len(), household_count().unwrap() * 6);
        let unique: BTreeSet<CharacterId> = characters.iter().map(|c| c.id).collect();
        assert_eq!(unique.len(), characters.len());
        assert_eq!(characters.first().map(|c| c.id), Some(CharacterId::new(1)));
    }

    #[test]
    fn first_household_is_linked() {
        let characters = roster();
        let husband = &characters[0];
        let wife = &characters[1];
        assert_eq!(husband.full_name(), "Publius Cornelius Scipio Asina");
        assert_eq!(husband.age, 37);
        assert_eq!((husband.birth_month, husband.birth_day), (3, 12));
        assert_eq!(husband.spouse_id, Some(wife.id));
        assert_eq!(wife.spouse_id, Some(husband.id));
        assert_eq!(wife.gender, Gender::Female);
        assert_eq!(wife.name.praenomen, None);

        let first_son = &characters[2];
        let second_son = &characters[3];
        assert_eq!(first_son.father_id, Some(husband.id));
        assert_eq!(first_son.mother_id, Some(wife.id));
        assert_eq!(first_son.sibling_id, None);
        assert_eq!(second_son.sibling_id, Some(first_son.id));
        assert_eq!(first_son.branch.as_deref(), Some("Scipio"));

        let daughter = &characters[4];
        assert_eq!(daughter.name.nomen, "Cornelia");
        assert_eq!(daughter.family, "Cornelius");
    }

    #[test]
    fn feminine_family_keys_are_masculinized() {
        let characters = roster();
        assert!(characters.iter().all(|c| !c.family.ends_with("ia")));
    }

    #[test]
    fn derived_fields_are_sane_and_deterministic() {
        let first = roster();
        let second = roster();
        assert_eq!(first, second);
        for character in &first {
            assert!(character.pools.is_sane());
            assert!(character.stats.is_within_bounds());
        }
        assert!(first.iter().any(|c| c.faction != Faction::Neutral));
    }

    #[test]
    fn traits_raise_their_attribute() {
        let name = RomanName::new(Some("Marcus"), "Atilius", Some("Regulus"), Gender::Male);
        let birth = SimDate::new(-284, 3, 12).unwrap();
        let mut plain = Character::new(CharacterId::new(1), name, "Atilius", SocialClass::Plebeian, birth, 36);
        let mut bold = plain.clone();
        bold.traits = vec!["Bold".to_owned(), "Strategic".to_owned()];
        derive_political_fields(&mut plain);
        derive_political_fields(&mut bold);
        assert_eq!(bold.stats.courage, plain.stats.courage + TRAIT_BONUS);
        assert_eq!(bold.stats.strategy, plain.stats.strategy + TRAIT_BONUS);
        assert!(bold.pools.military > plain.pools.military);
    }
}
