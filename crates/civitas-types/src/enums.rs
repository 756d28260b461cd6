//! Enumeration types for the Civitas simulation.
//!
//! Every enumeration carries a lenient constructor used when reading
//! external rosters, where values arrive as integer codes or free text.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

/// Biological gender of a character, used by naming and marriage rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male character (roster code `0`).
    Male,
    /// Female character (roster code `1`).
    Female,
}

impl Gender {
    /// Decode a roster integer code. Returns `None` for unknown codes.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Male),
            1 => Some(Self::Female),
            _ => None,
        }
    }

    /// Return the opposite gender.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl core::fmt::Display for Gender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

// ---------------------------------------------------------------------------
// SocialClass
// ---------------------------------------------------------------------------

/// Social order a character belongs to.
///
/// The class drives ambition goals and marriage preference weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SocialClass {
    /// Old senatorial aristocracy (roster code `0`).
    Patrician,
    /// Common citizens, including wealthy plebeian houses (roster code `1`).
    Plebeian,
    /// Equestrian order of wealthy non-senatorial families (roster code `2`).
    Equestrian,
}

impl SocialClass {
    /// All classes in declaration order.
    pub const ALL: [Self; 3] = [Self::Patrician, Self::Plebeian, Self::Equestrian];

    /// Decode a roster integer code. Returns `None` for unknown codes.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Patrician),
            1 => Some(Self::Plebeian),
            2 => Some(Self::Equestrian),
            _ => None,
        }
    }
}

impl core::fmt::Display for SocialClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Patrician => write!(f, "patrician"),
            Self::Plebeian => write!(f, "plebeian"),
            Self::Equestrian => write!(f, "equestrian"),
        }
    }
}

// ---------------------------------------------------------------------------
// Faction
// ---------------------------------------------------------------------------

/// Political faction a character is aligned with.
///
/// The derived `Ord` follows declaration order, which is also the
/// tie-breaking order used when two factions share the highest affinity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Faction {
    /// Senatorial traditionalists defending aristocratic privilege.
    Optimates,
    /// Reformers who court the assemblies and the urban plebs.
    Populares,
    /// Commanders and veterans whose power rests on the legions.
    Militares,
    /// Unaligned; the fallback for missing or malformed values.
    #[default]
    Neutral,
}

impl Faction {
    /// All factions in tie-breaking order.
    pub const ALL: [Self; 4] = [Self::Optimates, Self::Populares, Self::Militares, Self::Neutral];

    /// Parse a faction name case-insensitively, falling back to
    /// [`Faction::Neutral`] for anything unrecognised.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "optimates" | "optimate" => Self::Optimates,
            "populares" | "popularis" => Self::Populares,
            "militares" | "military" => Self::Militares,
            _ => Self::Neutral,
        }
    }

    /// Position of the faction in [`Faction::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Optimates => 0,
            Self::Populares => 1,
            Self::Militares => 2,
            Self::Neutral => 3,
        }
    }
}

impl core::fmt::Display for Faction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Optimates => write!(f, "Optimates"),
            Self::Populares => write!(f, "Populares"),
            Self::Militares => write!(f, "Militares"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_codes_decode() {
        assert_eq!(Gender::from_code(0), Some(Gender::Male));
        assert_eq!(Gender::from_code(1), Some(Gender::Female));
        assert_eq!(Gender::from_code(7), None);
        assert_eq!(SocialClass::from_code(1), Some(SocialClass::Plebeian));
        assert_eq!(SocialClass::from_code(-1), None);
    }

    #[test]
    fn malformed_faction_defaults_to_neutral() {
        assert_eq!(Faction::parse_lenient(" populares "), Faction::Populares);
        assert_eq!(Faction::parse_lenient("OPTIMATES"), Faction::Optimates);
        assert_eq!(Faction::parse_lenient("Carthaginian"), Faction::Neutral);
        assert_eq!(Faction::parse_lenient(""), Faction::Neutral);
    }

    #[test]
    fn faction_order_matches_index() {
        for (position, faction) in Faction::ALL.iter().enumerate() {
            assert_eq!(faction.index(), position);
        }
        assert!(Faction::Optimates < Faction::Neutral);
    }
}
