//! Core type definitions used throughout the codebase

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::CombatError;

/// One of the two participants in a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Side::Attacker => "attacker",
            Side::Defender => "defender",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Side {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attacker" => Ok(Side::Attacker),
            "defender" => Ok(Side::Defender),
            other => Err(CombatError::UnknownSide(other.to_string())),
        }
    }
}

/// Kind of engagement the caller is launching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    /// Full assault on a sector; soldiers ride carriers and can capture ground
    #[default]
    Invasion,
    /// Soldier-only raid; never captures sectors
    Guerilla,
    /// Fleet engagement against raiders; every combat unit fights
    PirateDefense,
}

impl AttackType {
    pub fn name(&self) -> &'static str {
        match self {
            AttackType::Invasion => "invasion",
            AttackType::Guerilla => "guerilla",
            AttackType::PirateDefense => "pirate_defense",
        }
    }

    /// Can this attack type take sectors from the defender?
    pub fn can_capture(&self) -> bool {
        matches!(self, AttackType::Invasion)
    }

    /// Does the attacker have to bring soldiers?
    pub fn requires_soldiers(&self) -> bool {
        matches!(self, AttackType::Invasion | AttackType::Guerilla)
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttackType {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "invasion" => Ok(AttackType::Invasion),
            "guerilla" => Ok(AttackType::Guerilla),
            "pirate_defense" => Ok(AttackType::PirateDefense),
            other => Err(CombatError::UnknownAttackType(other.to_string())),
        }
    }
}
