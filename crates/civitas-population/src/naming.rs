//! Naming rules and the explicit generation context.
//!
//! Anything that creates characters needs three collaborators: an ID
//! source, a random source, and a naming-rule provider. They are bundled in
//! a [`GenerationContext`] and passed explicitly, so there is no process-wide
//! counter or generator to reset between tests.

use rand::{Rng, RngCore};

use civitas_types::{CharacterId, Gender, RomanName};

use crate::error::PopulationError;
use crate::rng::SeededRng;

/// Masculine praenomina in common use among the roster families.
pub const MALE_PRAENOMINA: &[&str] = &[
    "Publius", "Gaius", "Marcus", "Lucius", "Quintus", "Tiberius", "Aulus", "Sextus", "Spurius",
    "Titus", "Servius", "Appius", "Gnaeus",
];

/// Trait tags handed out to newborns.
pub const TRAIT_POOL: &[&str] = &[
    "Ambitious",
    "Pious",
    "Disciplined",
    "Studious",
    "Courageous",
    "Patient",
    "Observant",
    "Graceful",
    "Curious",
    "Diplomatic",
    "Prudent",
    "Bold",
    "Loyal",
    "Cheerful",
    "Determined",
    "Insightful",
    "Kind",
    "Devout",
    "Strategic",
    "Energetic",
    "Calm",
    "Gentle",
    "Charismatic",
    "Resolute",
    "Eloquent",
    "Perceptive",
    "Resourceful",
    "Inventive",
    "Vigilant",
    "Supportive",
];

// ---------------------------------------------------------------------------
// IdAllocator
// ---------------------------------------------------------------------------

/// Hands out monotonically increasing character IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    next: CharacterId,
}

impl IdAllocator {
    /// Allocator whose first ID is `next`.
    pub const fn starting_at(next: CharacterId) -> Self {
        Self { next }
    }

    /// The ID the next call to [`IdAllocator::allocate`] will return.
    pub const fn peek(&self) -> CharacterId {
        self.next
    }

    /// Take the next ID.
    pub fn allocate(&mut self) -> Result<CharacterId, PopulationError> {
        let id = self.next;
        self.next = id.next().ok_or(PopulationError::IdOverflow)?;
        Ok(id)
    }

    /// Make sure IDs already in use are never handed out again.
    pub fn observe(&mut self, used: CharacterId) {
        if let Some(after) = used.next() {
            if after > self.next {
                self.next = after;
            }
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::starting_at(CharacterId::new(1))
    }
}

// ---------------------------------------------------------------------------
// NamingRules
// ---------------------------------------------------------------------------

/// Provider of structured names for new and damaged records.
pub trait NamingRules {
    /// Name a newborn of `gender` into `family`, optionally following the
    /// father's name.
    fn name_child(
        &self,
        family: &str,
        father: Option<&RomanName>,
        gender: Gender,
        rng: &mut dyn RngCore,
    ) -> RomanName;

    /// Return a corrected copy of `name` when parts are missing or do not
    /// match `gender`, or `None` when it is already acceptable.
    fn repair(
        &self,
        name: &RomanName,
        family: &str,
        gender: Gender,
        rng: &mut dyn RngCore,
    ) -> Option<RomanName>;
}

/// Republican-era naming conventions.
///
/// Sons take a praenomen, the clan nomen, and the father's hereditary
/// cognomen. Daughters carry no praenomen and feminine forms of the nomen
/// and cognomen.
#[derive(Debug, Clone, Copy, Default)]
pub struct RomanNamingRules;

impl RomanNamingRules {
    /// Feminine form of a nomen or cognomen (`Cornelius` to `Cornelia`,
    /// `Maximus` to `Maxima`, `Pulcher` to `Pulchra`).
    pub fn feminize(word: &str) -> String {
        let word = word.trim();
        if let Some(stem) = word.strip_suffix("ius") {
            format!("{stem}ia")
        } else if let Some(stem) = word.strip_suffix("us") {
            format!("{stem}a")
        } else if let Some(stem) = word.strip_suffix("er") {
            format!("{stem}ra")
        } else {
            word.to_owned()
        }
    }

    /// Masculine form of a clan name given either gender (`Cornelia` to
    /// `Cornelius`).
    pub fn masculinize_nomen(word: &str) -> String {
        let word = word.trim();
        match word.strip_suffix("ia") {
            Some(stem) => format!("{stem}ius"),
            None => word.to_owned(),
        }
    }

    fn nomen_for(family: &str, gender: Gender) -> String {
        let masculine = Self::masculinize_nomen(family);
        match gender {
            Gender::Male => masculine,
            Gender::Female => Self::feminize(&masculine),
        }
    }

    fn pick_praenomen(rng: &mut dyn RngCore) -> String {
        let index = rng.random_range(0..MALE_PRAENOMINA.len());
        MALE_PRAENOMINA.get(index).copied().unwrap_or("Lucius").to_owned()
    }
}

impl NamingRules for RomanNamingRules {
    fn name_child(
        &self,
        family: &str,
        father: Option<&RomanName>,
        gender: Gender,
        rng: &mut dyn RngCore,
    ) -> RomanName {
        // Only the hereditary first word of the father's cognomen passes on.
        let inherited = father
            .and_then(|name| name.cognomen.as_deref())
            .and_then(|cognomen| cognomen.split_whitespace().next())
            .map(str::to_owned);

        match gender {
            Gender::Male => RomanName {
                praenomen: Some(Self::pick_praenomen(rng)),
                nomen: Self::nomen_for(family, gender),
                cognomen: inherited,
                gender,
            },
            Gender::Female => RomanName {
                praenomen: None,
                nomen: Self::nomen_for(family, gender),
                cognomen: inherited.map(|cognomen| Self::feminize(&cognomen)),
                gender,
            },
        }
    }

    fn repair(
        &self,
        name: &RomanName,
        family: &str,
        gender: Gender,
        rng: &mut dyn RngCore,
    ) -> Option<RomanName> {
        let mut fixed = name.clone();
        fixed.gender = gender;

        if fixed.nomen.trim().is_empty() && !family.trim().is_empty() {
            fixed.nomen = Self::nomen_for(family, gender);
        }

        let praenomen_blank = fixed
            .praenomen
            .as_deref()
            .is_none_or(|praenomen| praenomen.trim().is_empty());
        if gender == Gender::Male && praenomen_blank {
            fixed.praenomen = Some(Self::pick_praenomen(rng));
        } else if praenomen_blank {
            fixed.praenomen = None;
        }

        if fixed
            .cognomen
            .as_deref()
            .is_some_and(|cognomen| cognomen.trim().is_empty())
        {
            fixed.cognomen = None;
        }

        (fixed != *name).then_some(fixed)
    }
}

// ---------------------------------------------------------------------------
// GenerationContext
// ---------------------------------------------------------------------------

/// Collaborators needed to create new characters.
pub struct GenerationContext<'a> {
    /// Source of fresh IDs.
    pub ids: &'a mut IdAllocator,
    /// Random source for names, genders, and traits.
    pub rng: &'a mut SeededRng,
    /// Naming conventions.
    pub naming: &'a dyn NamingRules,
}

impl GenerationContext<'_> {
    /// Pick a trait tag from [`TRAIT_POOL`].
    pub fn random_trait(&mut self) -> &'static str {
        let index = self.rng.random_range(0..TRAIT_POOL.len());
        TRAIT_POOL.get(index).copied().unwrap_or("Pious")
    }
}
