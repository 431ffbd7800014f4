//! Combat stance system
//!
//! A side commits to one stance for the whole battle. The stance trades
//! hitting power against protection and decides how hard losses bite.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::CombatError;

/// Tactical stance chosen before a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CombatStance {
    /// All-out assault: hits harder, bleeds more
    Aggressive,
    /// No modifiers
    #[default]
    Balanced,
    /// Dug in: harder to hit, weaker strikes
    Defensive,
    /// Preserve the fleet above all
    Evasive,
}

impl CombatStance {
    pub const ALL: [CombatStance; 4] = [
        CombatStance::Aggressive,
        CombatStance::Balanced,
        CombatStance::Defensive,
        CombatStance::Evasive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CombatStance::Aggressive => "Aggressive",
            CombatStance::Balanced => "Balanced",
            CombatStance::Defensive => "Defensive",
            CombatStance::Evasive => "Evasive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CombatStance::Aggressive => "Press the attack at the cost of heavier losses",
            CombatStance::Balanced => "Standard engagement doctrine",
            CombatStance::Defensive => "Hold formation and make the enemy pay for every hit",
            CombatStance::Evasive => "Avoid decisive engagement and keep units alive",
        }
    }
}

impl fmt::Display for CombatStance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CombatStance {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aggressive" => Ok(CombatStance::Aggressive),
            "balanced" => Ok(CombatStance::Balanced),
            "defensive" => Ok(CombatStance::Defensive),
            "evasive" => Ok(CombatStance::Evasive),
            _ => Err(CombatError::UnknownStance(s.to_string())),
        }
    }
}

/// Numeric effect of a stance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StanceModifiers {
    /// Added to every roll this side makes
    pub attack_mod: i32,
    /// Added to the roll the opponent needs to hit this side
    pub defense_mod: i32,
    /// Scales this side's casualties (1.0 = baseline)
    pub casualty_multiplier: f64,
}

impl StanceModifiers {
    pub const fn new(attack_mod: i32, defense_mod: i32, casualty_multiplier: f64) -> Self {
        Self {
            attack_mod,
            defense_mod,
            casualty_multiplier,
        }
    }
}

impl Default for StanceModifiers {
    fn default() -> Self {
        Self::new(0, 0, 1.0)
    }
}

/// Modifiers plus display text, for callers that show stance choices
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StanceProfile {
    pub stance: CombatStance,
    #[serde(flatten)]
    pub modifiers: StanceModifiers,
    pub label: &'static str,
    pub description: &'static str,
}

/// Editable stance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StanceTable {
    pub aggressive: StanceModifiers,
    pub balanced: StanceModifiers,
    pub defensive: StanceModifiers,
    pub evasive: StanceModifiers,
}

impl Default for StanceTable {
    fn default() -> Self {
        Self {
            aggressive: StanceModifiers::new(3, -2, 1.25),
            balanced: StanceModifiers::new(0, 0, 1.0),
            defensive: StanceModifiers::new(-2, 3, 0.75),
            evasive: StanceModifiers::new(-1, -1, 0.5),
        }
    }
}

impl StanceTable {
    /// Look up the modifiers for a stance
    pub fn resolve(&self, stance: CombatStance) -> StanceModifiers {
        match stance {
            CombatStance::Aggressive => self.aggressive,
            CombatStance::Balanced => self.balanced,
            CombatStance::Defensive => self.defensive,
            CombatStance::Evasive => self.evasive,
        }
    }

    pub fn profile(&self, stance: CombatStance) -> StanceProfile {
        StanceProfile {
            stance,
            modifiers: self.resolve(stance),
            label: stance.label(),
            description: stance.description(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CombatStance, StanceModifiers)> + '_ {
        CombatStance::ALL
            .into_iter()
            .map(move |stance| (stance, self.resolve(stance)))
    }
}
