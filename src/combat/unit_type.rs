//! Unit types, their theaters and combat ratings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::CombatError;

/// Type of military unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Soldiers,
    Fighters,
    Stations,
    LightCruisers,
    HeavyCruisers,
    /// Transport only, no combat rating
    Carriers,
}

/// Combat domain a unit fights in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theater {
    Space,
    Orbital,
    Ground,
}

impl Theater {
    pub const ALL: [Theater; 3] = [Theater::Space, Theater::Orbital, Theater::Ground];

    pub fn name(&self) -> &'static str {
        match self {
            Theater::Space => "space",
            Theater::Orbital => "orbital",
            Theater::Ground => "ground",
        }
    }
}

impl UnitType {
    pub const ALL: [UnitType; 6] = [
        UnitType::Soldiers,
        UnitType::Fighters,
        UnitType::Stations,
        UnitType::LightCruisers,
        UnitType::HeavyCruisers,
        UnitType::Carriers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UnitType::Soldiers => "soldiers",
            UnitType::Fighters => "fighters",
            UnitType::Stations => "stations",
            UnitType::LightCruisers => "light_cruisers",
            UnitType::HeavyCruisers => "heavy_cruisers",
            UnitType::Carriers => "carriers",
        }
    }

    /// Theater this unit fights in; carriers fight in none
    pub fn theater(&self) -> Option<Theater> {
        match self {
            UnitType::Soldiers => Some(Theater::Ground),
            UnitType::Fighters | UnitType::Stations => Some(Theater::Orbital),
            UnitType::LightCruisers | UnitType::HeavyCruisers => Some(Theater::Space),
            UnitType::Carriers => None,
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitType {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('-', "_");
        UnitType::ALL
            .into_iter()
            .find(|unit| unit.name() == normalized)
            .ok_or_else(|| CombatError::UnknownUnitType(s.to_string()))
    }
}

/// Attack (TAR) and defense (DEF) rating of one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UnitRating {
    pub attack: i32,
    pub defense: i32,
}

impl UnitRating {
    pub const fn new(attack: i32, defense: i32) -> Self {
        Self { attack, defense }
    }

    /// Units with no rating never take a shot and are never targeted
    pub fn is_combatant(&self) -> bool {
        self.attack > 0 || self.defense > 0
    }

    /// Weight used when comparing theater strength
    pub fn theater_weight(&self) -> i64 {
        self.attack as i64 + self.defense as i64
    }
}

/// Ratings for every unit type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitRatingTable {
    pub soldiers: UnitRating,
    pub fighters: UnitRating,
    pub stations: UnitRating,
    pub light_cruisers: UnitRating,
    pub heavy_cruisers: UnitRating,
    pub carriers: UnitRating,
}

impl Default for UnitRatingTable {
    fn default() -> Self {
        Self {
            soldiers: UnitRating::new(1, 1),
            fighters: UnitRating::new(3, 2),
            stations: UnitRating::new(5, 8),
            light_cruisers: UnitRating::new(6, 4),
            heavy_cruisers: UnitRating::new(10, 8),
            carriers: UnitRating::new(0, 0),
        }
    }
}

impl UnitRatingTable {
    pub fn rating(&self, unit: UnitType) -> UnitRating {
        match unit {
            UnitType::Soldiers => self.soldiers,
            UnitType::Fighters => self.fighters,
            UnitType::Stations => self.stations,
            UnitType::LightCruisers => self.light_cruisers,
            UnitType::HeavyCruisers => self.heavy_cruisers,
            UnitType::Carriers => self.carriers,
        }
    }
}
