//! Base population loading.
//!
//! Reads the `{"Characters": [...]}` roster format with PascalCase keys and
//! integer gender and class codes. Every field is optional on the wire;
//! malformed values are repaired with a warning. A file that cannot be
//! read or parsed yields an empty population and an error log, leaving the
//! host to decide whether to continue.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use civitas_population::IdAllocator;
use civitas_types::{
    Character, CharacterId, Faction, Gender, InfluencePools, PoliticalStats, RomanName, SimDate,
    SocialClass, sanitize_pool,
};

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::roster::{builtin_roster, derive_political_fields};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RosterFile {
    #[serde(default)]
    characters: Vec<RawCharacter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawName {
    praenomen: Option<String>,
    nomen: Option<String>,
    cognomen: Option<String>,
    gender: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RawCharacter {
    #[serde(rename = "ID")]
    id: Option<u64>,
    roman_name: Option<RawName>,
    gender: Option<i64>,
    birth_year: Option<i32>,
    birth_month: Option<u32>,
    birth_day: Option<u32>,
    age: Option<i64>,
    is_alive: Option<bool>,
    #[serde(rename = "SpouseID")]
    spouse_id: Option<u64>,
    #[serde(rename = "FatherID")]
    father_id: Option<u64>,
    #[serde(rename = "MotherID")]
    mother_id: Option<u64>,
    #[serde(rename = "SiblingID")]
    sibling_id: Option<u64>,
    family: Option<String>,
    branch: Option<String>,
    class: Option<i64>,
    traits: Vec<String>,
    wealth: Option<f64>,
    influence: Option<i64>,
    senatorial_influence: Option<f64>,
    popular_influence: Option<f64>,
    military_influence: Option<f64>,
    family_influence: Option<f64>,
    oratory: Option<i64>,
    ambition_score: Option<i64>,
    courage: Option<i64>,
    dignitas: Option<i64>,
    administration: Option<i64>,
    judgment: Option<i64>,
    strategy: Option<i64>,
    civic: Option<i64>,
    faction: Option<String>,
}

impl RawCharacter {
    fn has_political_fields(&self) -> bool {
        let pools = [
            self.senatorial_influence,
            self.popular_influence,
            self.military_influence,
            self.family_influence,
        ];
        pools.iter().any(Option::is_some)
            || self.stat_fields().iter().any(Option::is_some)
            || self.faction.is_some()
    }

    const fn stat_fields(&self) -> [Option<i64>; 8] {
        [
            self.oratory,
            self.ambition_score,
            self.courage,
            self.dignitas,
            self.administration,
            self.judgment,
            self.strategy,
            self.civic,
        ]
    }
}

/// The starting population named by `config`.
///
/// Loads `population.base_roster` when set, otherwise builds the built-in
/// families as of the configured start year.
///
/// # Errors
///
/// Returns [`SimulationError::Roster`] if the built-in roster cannot be
/// assembled. A configured roster file never fails; see
/// [`load_roster_file`].
pub fn base_population(config: &SimulationConfig) -> Result<Vec<Character>, SimulationError> {
    let start_year = config.world.start_year;
    match &config.population.base_roster {
        Some(path) => Ok(load_roster_file(path, start_year)),
        None => {
            let mut ids = IdAllocator::default();
            Ok(builtin_roster(start_year, &mut ids)?)
        }
    }
}

/// Read a roster file, yielding an empty population on any failure.
pub fn load_roster_file(path: &Path, start_year: i32) -> Vec<Character> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(path = %path.display(), %err, "Failed to read base roster");
            return Vec::new();
        }
    };
    match parse_roster(&json, start_year) {
        Ok(characters) => {
            tracing::info!(
                path = %path.display(),
                characters = characters.len(),
                "Base roster loaded"
            );
            characters
        }
        Err(err) => {
            tracing::error!(path = %path.display(), %err, "Failed to parse base roster");
            Vec::new()
        }
    }
}

/// Parse roster JSON into characters, repairing malformed fields.
///
/// Records without an ID and repeated IDs are skipped with a warning. A
/// missing age is computed against `start_year`.
///
/// # Errors
///
/// Returns the JSON error if the document is not a roster at all.
pub fn parse_roster(json: &str, start_year: i32) -> Result<Vec<Character>, serde_json::Error> {
    let file: RosterFile = serde_json::from_str(json)?;
    let mut seen = BTreeSet::new();
    let mut characters = Vec::with_capacity(file.characters.len());
    for (position, raw) in file.characters.into_iter().enumerate() {
        let Some(id) = raw.id.map(CharacterId::new) else {
            tracing::warn!(position, "Roster record without an ID skipped");
            continue;
        };
        if !seen.insert(id) {
            tracing::warn!(%id, "Duplicate roster ID skipped");
            continue;
        }
        characters.push(build_character(id, raw, start_year));
    }
    Ok(characters)
}

fn build_character(id: CharacterId, raw: RawCharacter, start_year: i32) -> Character {
    let name_parts = raw.roman_name.as_ref();
    let gender_code = raw.gender.or_else(|| name_parts.and_then(|name| name.gender));
    let gender = gender_code.and_then(Gender::from_code).unwrap_or_else(|| {
        tracing::warn!(%id, code = ?gender_code, "Unknown gender code, assuming male");
        Gender::Male
    });
    let social_class = raw.class.and_then(SocialClass::from_code).unwrap_or_else(|| {
        tracing::warn!(%id, code = ?raw.class, "Unknown class code, assuming plebeian");
        SocialClass::Plebeian
    });

    let family = raw
        .family
        .as_deref()
        .map(str::trim)
        .filter(|family| !family.is_empty())
        .or_else(|| name_parts.and_then(|name| name.nomen.as_deref()))
        .unwrap_or_default()
        .to_owned();
    let nomen = name_parts
        .and_then(|name| name.nomen.as_deref())
        .unwrap_or(&family)
        .to_owned();
    let name = RomanName::new(
        name_parts.and_then(|name| name.praenomen.as_deref()),
        &nomen,
        name_parts.and_then(|name| name.cognomen.as_deref()),
        gender,
    );

    let birth_year = raw.birth_year.unwrap_or(start_year);
    let birth = SimDate::new(
        birth_year,
        raw.birth_month.unwrap_or(1),
        raw.birth_day.unwrap_or(1),
    )
    .unwrap_or_else(|| {
        tracing::warn!(
            %id,
            month = ?raw.birth_month,
            day = ?raw.birth_day,
            "Invalid birthday, using the first of January"
        );
        SimDate {
            year: birth_year,
            month: 1,
            day: 1,
        }
    });
    let elapsed = i64::from(start_year).saturating_sub(i64::from(birth_year));
    let age = raw.age.unwrap_or(elapsed);
    let age = u32::try_from(age).unwrap_or_else(|_| {
        tracing::warn!(%id, age, "Age out of range, clamped");
        if age < 0 { 0 } else { u32::MAX }
    });

    let mut character = Character::new(id, name, &family, social_class, birth, age);
    character.is_alive = raw.is_alive.unwrap_or(true);
    character.spouse_id = raw.spouse_id.map(CharacterId::new);
    character.father_id = raw.father_id.map(CharacterId::new);
    character.mother_id = raw.mother_id.map(CharacterId::new);
    character.sibling_id = raw.sibling_id.map(CharacterId::new);
    character.branch = raw
        .branch
        .as_deref()
        .map(str::trim)
        .filter(|branch| !branch.is_empty())
        .map(str::to_owned);
    character.wealth = wealth_from(id, raw.wealth);
    character.influence = raw
        .influence
        .map_or(0, |value| u32::try_from(value.max(0)).unwrap_or(u32::MAX));

    let political = raw.has_political_fields();
    let stat_fields = raw.stat_fields();
    character.traits = raw.traits;
    if political {
        character.pools = InfluencePools {
            senatorial: raw.senatorial_influence.unwrap_or(0.0),
            popular: raw.popular_influence.unwrap_or(0.0),
            military: raw.military_influence.unwrap_or(0.0),
            family: raw.family_influence.unwrap_or(0.0),
        };
        if !character.pools.is_sane() {
            tracing::warn!(%id, "Negative or non-finite influence pools sanitized");
            character.pools = character.pools.sanitized();
        }
        character.stats = stats_from(id, stat_fields);
        character.faction = raw.faction.as_deref().map_or(Faction::Neutral, |raw| {
            let faction = Faction::parse_lenient(raw);
            if faction == Faction::Neutral && !raw.trim().eq_ignore_ascii_case("neutral") {
                tracing::warn!(%id, faction = raw, "Unknown faction, using Neutral");
            }
            faction
        });
    } else {
        derive_political_fields(&mut character);
    }
    character
}

fn wealth_from(id: CharacterId, raw: Option<f64>) -> u64 {
    let Some(value) = raw else {
        return 0;
    };
    let clean = sanitize_pool(value);
    if (clean - value).abs() > f64::EPSILON || !value.is_finite() {
        tracing::warn!(%id, wealth = value, "Malformed wealth sanitized");
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let wealth = if clean >= u64::MAX as f64 {
        u64::MAX
    } else {
        clean.floor() as u64
    };
    wealth
}

fn stats_from(id: CharacterId, fields: [Option<i64>; 8]) -> PoliticalStats {
    let [oratory, ambition, courage, dignitas, administration, judgment, strategy, civic] =
        fields.map(|value| {
            let value = value.unwrap_or(0);
            let clamped = value.clamp(
                i64::from(PoliticalStats::MIN),
                i64::from(PoliticalStats::MAX),
            );
            if clamped != value {
                tracing::warn!(%id, value, "Attribute out of range, clamped");
            }
            i32::try_from(clamped).unwrap_or(PoliticalStats::MIN)
        });
    PoliticalStats {
        oratory,
        ambition,
        courage,
        dignitas,
        administration,
        judgment,
        strategy,
        civic,
    }
}
