//! Categorical labels over the behaviour model.

use serde::{Deserialize, Serialize};

use crate::behavior::{BehaviorModel, PowerBase};

/// Lean above which the conservative label applies.
pub const IDEOLOGY_HIGH: f64 = 0.6;

/// Lean below which the populist label applies.
pub const IDEOLOGY_LOW: f64 = 0.4;

/// Shares closer than this are treated as tied.
pub const TIE_EPSILON: f64 = 0.0001;

/// Blended martial disposition at or above which a character reads as martial.
pub const MARTIAL_THRESHOLD: f64 = 0.75;

/// Ideological orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdeologyLabel {
    /// Senatorial influence dominates.
    Conservative,
    /// Popular influence dominates.
    Populist,
    /// Neither side dominates.
    Moderate,
}

/// Dominant source of power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerBaseLabel {
    /// The senate.
    Senate,
    /// The assemblies.
    Popular,
    /// The legions.
    Military,
    /// Two or more sources tied for first.
    Diffuse,
}

/// Temperament in public life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperamentLabel {
    /// Reaches for force.
    Martial,
    /// Works through law and persuasion.
    Civil,
}

impl IdeologyLabel {
    /// Label for a conservatism lean.
    pub fn from_lean(conservatism: f64) -> Self {
        if conservatism > IDEOLOGY_HIGH {
            Self::Conservative
        } else if conservatism < IDEOLOGY_LOW {
            Self::Populist
        } else {
            Self::Moderate
        }
    }

    /// Display text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Populist => "Populist",
            Self::Moderate => "Moderate",
        }
    }
}

impl PowerBaseLabel {
    /// Label for the dominant share, or [`PowerBaseLabel::Diffuse`] on a tie.
    pub fn from_power_base(base: &PowerBase) -> Self {
        let labelled = [
            (Self::Senate, base.senate),
            (Self::Popular, base.popular),
            (Self::Military, base.military),
        ];
        let top = labelled
            .iter()
            .map(|(_, share)| *share)
            .fold(f64::NEG_INFINITY, f64::max);
        let mut leaders = labelled
            .iter()
            .filter(|(_, share)| (top - share).abs() <= TIE_EPSILON);
        match (leaders.next(), leaders.next()) {
            (Some((label, _)), None) => *label,
            _ => Self::Diffuse,
        }
    }

    /// Display text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Senate => "Senate",
            Self::Popular => "Popular",
            Self::Military => "Military",
            Self::Diffuse => "Diffuse",
        }
    }
}

impl TemperamentLabel {
    /// Label for a blended martial disposition.
    pub fn from_martial(martial: f64) -> Self {
        if martial >= MARTIAL_THRESHOLD {
            Self::Martial
        } else {
            Self::Civil
        }
    }

    /// Display text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Martial => "Martial",
            Self::Civil => "Civil",
        }
    }
}

/// Categorical description of a character's politics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliticalSummary {
    /// Ideological orientation.
    pub ideology: IdeologyLabel,
    /// Dominant power source.
    pub power_base: PowerBaseLabel,
    /// Temperament.
    pub temperament: TemperamentLabel,
}

impl PoliticalSummary {
    /// Label a behaviour model.
    pub fn from_behavior(behavior: &BehaviorModel) -> Self {
        Self {
            ideology: IdeologyLabel::from_lean(behavior.conservatism),
            power_base: PowerBaseLabel::from_power_base(&behavior.power_base),
            temperament: TemperamentLabel::from_martial(behavior.martial),
        }
    }

    /// Label texts, for keyword matching.
    pub const fn labels(&self) -> [&'static str; 3] {
        [
            self.ideology.as_str(),
            self.power_base.as_str(),
            self.temperament.as_str(),
        ]
    }
}
