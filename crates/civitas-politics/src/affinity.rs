//! Faction affinity distribution.
//!
//! Each faction receives a raw score from a fixed linear combination of
//! profile leans and behavioural dispositions, plus a bonus for every
//! summary label that matches one of the faction's keywords. Raw scores are
//! sanitised and normalised to sum to 1.
//!
//! # Invariants
//!
//! - Every score is finite and non-negative.
//! - Scores sum to 1 within [`SUM_TOLERANCE`].
//! - The primary faction holds the highest score; ties go to the faction
//!   listed first in [`Faction::ALL`].

use serde::{Deserialize, Serialize};

use civitas_types::Faction;

use crate::behavior::BehaviorModel;
use crate::profile::PoliticalProfile;
use crate::summary::PoliticalSummary;

/// Bonus per summary label matching a faction keyword.
pub const LABEL_BONUS: f64 = 0.25;

/// Drift from 1 tolerated before a second normalisation pass.
pub const SUM_TOLERANCE: f64 = 0.0005;

/// Label keywords associated with each faction.
pub const fn keywords(faction: Faction) -> &'static [&'static str] {
    match faction {
        Faction::Optimates => &["conservative", "senate"],
        Faction::Populares => &["populist", "popular"],
        Faction::Militares => &["military", "martial"],
        Faction::Neutral => &["moderate", "diffuse"],
    }
}

/// Number of summary labels containing one of `faction`'s keywords.
fn label_matches(faction: Faction, summary: &PoliticalSummary) -> u32 {
    let mut matched = 0_u32;
    for label in summary.labels() {
        let label = label.to_ascii_lowercase();
        if keywords(faction).iter().any(|keyword| label.contains(keyword)) {
            matched = matched.saturating_add(1);
        }
    }
    matched
}

/// Raw, unnormalised score for one faction.
pub fn raw_score(
    faction: Faction,
    profile: &PoliticalProfile,
    behavior: &BehaviorModel,
    summary: &PoliticalSummary,
) -> f64 {
    let linear = match faction {
        Faction::Optimates => {
            0.45 * profile.senate_lean
                + 0.25 * behavior.conservatism
                + 0.15 * behavior.honor
                + 0.15 * profile.family_lean
        }
        Faction::Populares => {
            0.45 * (1.0 - profile.senate_lean)
                + 0.25 * behavior.populism
                + 0.15 * behavior.assertiveness
                + 0.15 * behavior.ambition
        }
        Faction::Militares => {
            0.45 * profile.military_lean
                + 0.25 * behavior.martial
                + 0.15 * behavior.power_base.military
                + 0.15 * behavior.assertiveness
        }
        Faction::Neutral => {
            let balance = 1.0 - 2.0 * (profile.senate_lean - 0.5).abs();
            0.35 * balance + 0.35 * behavior.stability + 0.3 * behavior.pragmatism
        }
    };
    linear + LABEL_BONUS * f64::from(label_matches(faction, summary))
}

/// Normalised affinity toward every faction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactionAffinity {
    scores: [f64; 4],
    primary: Faction,
}

impl FactionAffinity {
    /// Score every faction and normalise.
    pub fn compute(
        profile: &PoliticalProfile,
        behavior: &BehaviorModel,
        summary: &PoliticalSummary,
    ) -> Self {
        let raw = Faction::ALL.map(|faction| raw_score(faction, profile, behavior, summary));
        Self::from_raw(raw)
    }

    /// Normalise raw scores given in [`Faction::ALL`] order.
    ///
    /// Negative and non-finite scores count as zero; when nothing is left
    /// the distribution is uniform.
    pub fn from_raw(raw: [f64; 4]) -> Self {
        let mut scores = raw.map(|score| if score.is_finite() && score > 0.0 { score } else { 0.0 });
        let total: f64 = scores.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            scores = [0.25; 4];
        } else {
            for score in &mut scores {
                *score /= total;
            }
        }

        let primary = leader(&scores);
        let residual = 1.0 - scores.iter().sum::<f64>();
        if let Some(top) = scores.get_mut(primary.index()) {
            *top = (*top + residual).max(0.0);
        }
        let sum: f64 = scores.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE && sum > 0.0 {
            for score in &mut scores {
                *score /= sum;
            }
        }

        Self {
            primary: leader(&scores),
            scores,
        }
    }

    /// Faction with the highest score.
    pub const fn primary(&self) -> Faction {
        self.primary
    }

    /// Score for one faction.
    pub fn score(&self, faction: Faction) -> f64 {
        self.scores.get(faction.index()).copied().unwrap_or(0.0)
    }

    /// Scores in [`Faction::ALL`] order.
    pub const fn scores(&self) -> [f64; 4] {
        self.scores
    }

    /// `(faction, score)` pairs in [`Faction::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Faction, f64)> + '_ {
        Faction::ALL.into_iter().zip(self.scores.iter().copied())
    }

    /// Sum of all scores.
    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }
}

/// Highest score, first faction winning ties.
fn leader(scores: &[f64; 4]) -> Faction {
    let mut best = Faction::Optimates;
    let mut best_score = f64::NEG_INFINITY;
    for (faction, score) in Faction::ALL.into_iter().zip(scores.iter().copied()) {
        if score > best_score {
            best = faction;
            best_score = score;
        }
    }
    best
}
