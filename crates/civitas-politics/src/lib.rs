//! Political scoring pipeline for the Civitas simulation.
//!
//! A chain of pure transformations over a character's political fields:
//! profile, behaviour model, summary labels, faction affinity. Nothing here
//! mutates its input or holds shared state, so assessments may run from
//! any number of threads at once.
//!
//! # Modules
//!
//! - [`profile`] -- Sanitised pools and stats plus lean ratios ([`PoliticalProfile`])
//! - [`behavior`] -- Normalised dispositions ([`BehaviorModel`], [`PowerBase`])
//! - [`summary`] -- Threshold labels ([`PoliticalSummary`])
//! - [`affinity`] -- Per-faction distribution ([`FactionAffinity`])

pub mod affinity;
pub mod behavior;
pub mod profile;
pub mod summary;

use serde::{Deserialize, Serialize};

use civitas_types::Character;

pub use affinity::{FactionAffinity, LABEL_BONUS, SUM_TOLERANCE};
pub use behavior::{BehaviorModel, PowerBase, blend_with_neutral};
pub use profile::{PoliticalProfile, clamp01, safe_div};
pub use summary::{IdeologyLabel, PoliticalSummary, PowerBaseLabel, TemperamentLabel};

/// Every pipeline stage for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticalAssessment {
    /// Sanitised political view.
    pub profile: PoliticalProfile,
    /// Behavioural dispositions.
    pub behavior: BehaviorModel,
    /// Categorical labels.
    pub summary: PoliticalSummary,
    /// Faction distribution.
    pub affinity: FactionAffinity,
}

/// Run the whole pipeline for one character.
pub fn assess(character: &Character) -> PoliticalAssessment {
    let profile = PoliticalProfile::of(character);
    let behavior = BehaviorModel::from_profile(&profile);
    let summary = PoliticalSummary::from_behavior(&behavior);
    let affinity = FactionAffinity::compute(&profile, &behavior, &summary);
    PoliticalAssessment {
        profile,
        behavior,
        summary,
        affinity,
    }
}

/// Assess every character yielded by `characters`, preserving order.
pub fn assess_all<'a, I>(characters: I) -> Vec<PoliticalAssessment>
where
    I: IntoIterator<Item = &'a Character>,
{
    characters.into_iter().map(assess).collect()
}
