//! Sanitised political view of a character.
//!
//! A [`PoliticalProfile`] is the first stage of the scoring pipeline. It
//! copies the political fields out of a character, forces them into range,
//! and derives four lean ratios that later stages build on.
//!
//! # Invariants
//!
//! - Every pool is finite and non-negative.
//! - Every stat lies in `[0, 20]`.
//! - Every lean lies in `[0, 1]`.

use serde::{Deserialize, Serialize};

use civitas_types::{Character, CharacterId, Faction, InfluencePools, PoliticalStats, SocialClass};

/// Lean reported when neither side of a comparison has any weight.
pub const NO_OPINION: f64 = 0.5;

/// Clamp to `[0, 1]`, mapping non-finite values to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `numerator / denominator` clamped to `[0, 1]`.
///
/// Returns 0 when either side is non-positive or non-finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if !numerator.is_finite() || !denominator.is_finite() || numerator <= 0.0 || denominator <= 0.0
    {
        return 0.0;
    }
    clamp01(numerator / denominator)
}

/// Share of `left` in `left + right`, or [`NO_OPINION`] when both are zero.
pub fn relative_share(left: f64, right: f64) -> f64 {
    let left = civitas_types::sanitize_pool(left);
    let right = civitas_types::sanitize_pool(right);
    let total = left + right;
    if total <= 0.0 {
        NO_OPINION
    } else {
        safe_div(left, total)
    }
}

/// Clamped political fields plus derived leans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticalProfile {
    /// Character the profile describes.
    pub id: CharacterId,
    /// Declared faction.
    pub faction: Faction,
    /// Social class.
    pub social_class: SocialClass,
    /// Sanitised influence pools.
    pub pools: InfluencePools,
    /// Clamped attributes.
    pub stats: PoliticalStats,
    /// Sum of the four pools.
    pub total_influence: f64,
    /// Senatorial against popular influence; 0.5 when both are zero.
    pub senate_lean: f64,
    /// Senatorial plus popular influence as a share of the total.
    pub civic_lean: f64,
    /// Military influence as a share of the total.
    pub military_lean: f64,
    /// Family influence as a share of the total.
    pub family_lean: f64,
}

impl PoliticalProfile {
    /// Build the profile of `character`.
    pub fn of(character: &Character) -> Self {
        Self::from_parts(
            character.id,
            character.faction,
            character.social_class,
            &character.pools,
            &character.stats,
        )
    }

    /// Build a profile from raw, possibly malformed, political fields.
    pub fn from_parts(
        id: CharacterId,
        faction: Faction,
        social_class: SocialClass,
        pools: &InfluencePools,
        stats: &PoliticalStats,
    ) -> Self {
        let pools = pools.sanitized();
        let total_influence = pools.senatorial + pools.popular + pools.military + pools.family;
        Self {
            id,
            faction,
            social_class,
            pools,
            stats: stats.clamped(),
            total_influence,
            senate_lean: relative_share(pools.senatorial, pools.popular),
            civic_lean: safe_div(pools.senatorial + pools.popular, total_influence),
            military_lean: safe_div(pools.military, total_influence),
            family_lean: safe_div(pools.family, total_influence),
        }
    }

    /// Leans in declaration order.
    pub const fn leans(&self) -> [f64; 4] {
        [
            self.senate_lean,
            self.civic_lean,
            self.military_lean,
            self.family_lean,
        ]
    }
}
