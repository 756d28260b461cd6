//! Behavioural dispositions derived from a political profile.
//!
//! Attribute-driven dispositions are blended with a neutral baseline:
//! `0.5 + 0.5 * clamp01(x)`. Low attributes therefore leave a disposition
//! at neutral and high attributes push it toward 1. Ideology and power base
//! come from influence shares instead and use the full `[0, 1]` range.

use serde::{Deserialize, Serialize};

use civitas_types::PoliticalStats;

use crate::profile::{PoliticalProfile, clamp01, relative_share};

/// Blend a raw `[0, 1]` score with the neutral baseline.
///
/// Non-finite input counts as 0, so the result is always in `[0.5, 1]`.
pub fn blend_with_neutral(raw: f64) -> f64 {
    0.5 + 0.5 * clamp01(raw)
}

/// Attribute scaled from `[0, 20]` to `[0, 1]`.
pub fn normalized_stat(value: i32) -> f64 {
    let value = value.clamp(PoliticalStats::MIN, PoliticalStats::MAX);
    f64::from(value) / f64::from(PoliticalStats::MAX)
}

fn mean(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().copied().map(normalized_stat).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = values.len() as f64;
    sum / count
}

/// Shares of senatorial, popular, and military influence.
///
/// Always sums to 1; an equal split when all three pools are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerBase {
    /// Senatorial share.
    pub senate: f64,
    /// Popular share.
    pub popular: f64,
    /// Military share.
    pub military: f64,
}

impl PowerBase {
    /// Normalise three pools into shares.
    pub fn from_pools(senate: f64, popular: f64, military: f64) -> Self {
        let clean = |value: f64| if value.is_finite() && value > 0.0 { value } else { 0.0 };
        let (senate, popular, military) = (clean(senate), clean(popular), clean(military));
        let total = senate + popular + military;
        if total <= 0.0 || !total.is_finite() {
            let third = 1.0 / 3.0;
            return Self {
                senate: third,
                popular: third,
                military: third,
            };
        }
        Self {
            senate: senate / total,
            popular: popular / total,
            military: military / total,
        }
    }

    /// Shares in `[senate, popular, military]` order.
    pub const fn shares(&self) -> [f64; 3] {
        [self.senate, self.popular, self.military]
    }
}

/// Normalised behavioural dispositions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorModel {
    /// Willingness to press a case in public. Blended.
    pub assertiveness: f64,
    /// Steadiness under pressure. Blended.
    pub stability: f64,
    /// Regard for custom and personal honour. Blended.
    pub honor: f64,
    /// Drive to hold office. Blended.
    pub ambition: f64,
    /// Inclination to solve problems by force. Blended.
    pub martial: f64,
    /// Practical competence, unblended in `[0, 1]`.
    pub pragmatism: f64,
    /// Senatorial share of senatorial plus popular influence.
    pub conservatism: f64,
    /// Popular share of senatorial plus popular influence.
    pub populism: f64,
    /// Where the character's power comes from.
    pub power_base: PowerBase,
}

impl BehaviorModel {
    /// Derive dispositions from a profile.
    pub fn from_profile(profile: &PoliticalProfile) -> Self {
        let stats = &profile.stats;
        let pools = &profile.pools;
        Self {
            assertiveness: blend_with_neutral(mean(&[stats.oratory, stats.courage])),
            stability: blend_with_neutral(mean(&[stats.judgment, stats.administration])),
            honor: blend_with_neutral(mean(&[stats.dignitas, stats.civic])),
            ambition: blend_with_neutral(normalized_stat(stats.ambition)),
            martial: blend_with_neutral(mean(&[stats.strategy, stats.courage])),
            pragmatism: clamp01(mean(&[stats.administration, stats.judgment, stats.civic])),
            conservatism: relative_share(pools.senatorial, pools.popular),
            populism: relative_share(pools.popular, pools.senatorial),
            power_base: PowerBase::from_pools(pools.senatorial, pools.popular, pools.military),
        }
    }

    /// Every scalar output, for finiteness checks.
    pub const fn values(&self) -> [f64; 11] {
        [
            self.assertiveness,
            self.stability,
            self.honor,
            self.ambition,
            self.martial,
            self.pragmatism,
            self.conservatism,
            self.populism,
            self.power_base.senate,
            self.power_base.popular,
            self.power_base.military,
        ]
    }
}

#[cfg(test)]
mod tests {
    use civitas_types::{CharacterId, Faction, InfluencePools, SocialClass};

    use super::*;

    fn model(stats: PoliticalStats, pools: InfluencePools) -> BehaviorModel {
        let profile = PoliticalProfile::from_parts(
            CharacterId::new(1),
            Faction::Neutral,
            SocialClass::Plebeian,
            &pools,
            &stats,
        );
        BehaviorModel::from_profile(&profile)
    }

    #[test]
    fn blend_never_drops_below_neutral() {
        assert!((blend_with_neutral(0.0) - 0.5).abs() < 1e-12);
        assert!((blend_with_neutral(-3.0) - 0.5).abs() < 1e-12);
        assert!((blend_with_neutral(f64::NAN) - 0.5).abs() < 1e-12);
        assert!((blend_with_neutral(1.0) - 1.0).abs() < 1e-12);
        assert!((blend_with_neutral(0.5) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn zero_stats_sit_at_neutral() {
        let built = model(PoliticalStats::uniform(0), InfluencePools::default());
        assert!((built.assertiveness - 0.5).abs() < 1e-12);
        assert!((built.martial - 0.5).abs() < 1e-12);
        assert!(built.pragmatism.abs() < 1e-12);
        assert!((built.conservatism - 0.5).abs() < 1e-12);
        assert!((built.populism - 0.5).abs() < 1e-12);
        for share in built.power_base.shares() {
            assert!((share - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ideology_follows_pool_shares() {
        let pools = InfluencePools {
            senatorial: 10.0,
            popular: 30.0,
            military: 60.0,
            family: 5.0,
        };
        let built = model(PoliticalStats::uniform(20), pools);
        assert!((built.conservatism - 0.25).abs() < 1e-12);
        assert!((built.populism - 0.75).abs() < 1e-12);
        assert!((built.power_base.military - 0.6).abs() < 1e-12);
        let sum: f64 = built.power_base.shares().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((built.assertiveness - 1.0).abs() < 1e-12);
    }

    #[test]
    fn malformed_inputs_stay_finite() {
        let pools = InfluencePools {
            senatorial: f64::INFINITY,
            popular: f64::NAN,
            military: -2.0,
            family: f64::NEG_INFINITY,
        };
        let built = model(PoliticalStats::uniform(-9), pools);
        assert!(built.values().iter().all(|value| value.is_finite()));
    }
}
