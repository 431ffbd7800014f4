//! Game-balance configuration
//!
//! Every tunable number the combat engine uses lives in [`BalanceTable`].
//! Sections default individually, so a TOML file only needs to name the
//! values it changes.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::combat::constants::*;
use crate::combat::stance::StanceTable;
use crate::combat::unit_type::{UnitRatingTable, UnitType};
use crate::core::error::{CombatError, Result};

/// Transport rules for invasions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Soldiers a single carrier can land
    pub soldiers_per_carrier: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            soldiers_per_carrier: SOLDIERS_PER_CARRIER,
        }
    }
}

/// Theater control thresholds and bonus sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TheaterConfig {
    /// Strength ratio over the opponent needed to control a theater
    pub dominance_ratio: f64,
    /// Attack bonus granted by Space Dominance
    pub space_dominance_attack: i32,
    /// Defense bonus granted by Orbital Shield
    pub orbital_shield_defense: i32,
}

impl Default for TheaterConfig {
    fn default() -> Self {
        Self {
            dominance_ratio: DOMINANCE_RATIO,
            space_dominance_attack: SPACE_DOMINANCE_ATTACK,
            orbital_shield_defense: ORBITAL_SHIELD_DEFENSE,
        }
    }
}

/// Dice and shot budget for a single volley
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolleyConfig {
    pub die_sides: u32,
    /// Roll target before the defender's rating and modifiers are added
    pub base_defense_threshold: i32,
    /// Damage multiplier on a natural maximum roll
    pub critical_multiplier: f64,
    /// Committed combat units represented by one shot
    pub units_per_shot: u64,
    /// Upper bound on shots per side per volley
    pub max_shots: u32,
}

impl Default for VolleyConfig {
    fn default() -> Self {
        Self {
            die_sides: DIE_SIDES,
            base_defense_threshold: BASE_DEFENSE_THRESHOLD,
            critical_multiplier: CRITICAL_MULTIPLIER,
            units_per_shot: UNITS_PER_SHOT,
            max_shots: MAX_SHOTS_PER_VOLLEY,
        }
    }
}

/// How damage turns into lost units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasualtyConfig {
    /// Loss fraction per point of damage-to-defense-value ratio
    pub damage_scale: f64,
    /// Cap on the fraction of a side destroyed in one volley
    pub max_loss_per_volley: f64,
    /// Fraction of remaining committed units lost when withdrawing
    pub retreat_penalty: f64,
}

impl Default for CasualtyConfig {
    fn default() -> Self {
        Self {
            damage_scale: CASUALTY_DAMAGE_SCALE,
            max_loss_per_volley: MAX_LOSS_PER_VOLLEY,
            retreat_penalty: RETREAT_PENALTY,
        }
    }
}

/// Sectors taken on a successful invasion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub decisive_sectors: u32,
    pub victory_sectors: u32,
    pub ground_superiority_sectors: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            decisive_sectors: DECISIVE_SECTORS,
            victory_sectors: VICTORY_SECTORS,
            ground_superiority_sectors: GROUND_SUPERIORITY_SECTORS,
        }
    }
}

/// Effectiveness swings in percentage points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectivenessConfig {
    pub decisive_win: f64,
    pub win: f64,
    pub loss: f64,
    pub decisive_loss: f64,
    pub stalemate: f64,
    pub retreat: f64,
}

impl Default for EffectivenessConfig {
    fn default() -> Self {
        Self {
            decisive_win: EFFECTIVENESS_DECISIVE_WIN,
            win: EFFECTIVENESS_WIN,
            loss: EFFECTIVENESS_LOSS,
            decisive_loss: EFFECTIVENESS_DECISIVE_LOSS,
            stalemate: EFFECTIVENESS_STALEMATE,
            retreat: EFFECTIVENESS_RETREAT,
        }
    }
}

/// Complete balance table for the combat engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BalanceTable {
    pub units: UnitRatingTable,
    pub transport: TransportConfig,
    pub stances: StanceTable,
    pub theater: TheaterConfig,
    pub volley: VolleyConfig,
    pub casualties: CasualtyConfig,
    pub capture: CaptureConfig,
    pub effectiveness: EffectivenessConfig,
}

impl BalanceTable {
    /// Create a table with the shipped defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a balance table from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a balance table from a TOML string and validate it
    pub fn parse_toml(content: &str) -> Result<Self> {
        let table: BalanceTable = toml::from_str(content)?;
        table.validate()?;
        Ok(table)
    }

    /// Validate the table for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(CombatError::InvalidBalance(msg));

        for unit in UnitType::ALL {
            let rating = self.units.rating(unit);
            if rating.attack < 0 || rating.defense < 0 {
                return invalid(format!("{} ratings must be non-negative", unit));
            }
        }

        if self.transport.soldiers_per_carrier == 0 {
            return invalid("soldiers_per_carrier must be positive".into());
        }

        for (stance, mods) in self.stances.iter() {
            if !mods.casualty_multiplier.is_finite() || mods.casualty_multiplier < 0.0 {
                return invalid(format!(
                    "{} casualty_multiplier ({}) must be a non-negative number",
                    stance, mods.casualty_multiplier
                ));
            }
        }

        if !(self.theater.dominance_ratio >= 1.0) {
            return invalid(format!(
                "dominance_ratio ({}) must be at least 1.0",
                self.theater.dominance_ratio
            ));
        }

        if self.volley.die_sides < 2 {
            return invalid(format!("die_sides ({}) must be at least 2", self.volley.die_sides));
        }
        if self.volley.units_per_shot == 0 || self.volley.max_shots == 0 {
            return invalid("units_per_shot and max_shots must be positive".into());
        }
        if !(self.volley.critical_multiplier >= 1.0) {
            return invalid(format!(
                "critical_multiplier ({}) must be at least 1.0",
                self.volley.critical_multiplier
            ));
        }

        let c = &self.casualties;
        if !(c.damage_scale >= 0.0) || !c.damage_scale.is_finite() {
            return invalid(format!("damage_scale ({}) must be non-negative", c.damage_scale));
        }
        if !(c.max_loss_per_volley > 0.0 && c.max_loss_per_volley <= 1.0) {
            return invalid(format!(
                "max_loss_per_volley ({}) must be in (0, 1]",
                c.max_loss_per_volley
            ));
        }
        if !(c.retreat_penalty >= 0.0 && c.retreat_penalty <= 1.0) {
            return invalid(format!(
                "retreat_penalty ({}) must be in [0, 1]",
                c.retreat_penalty
            ));
        }

        Ok(())
    }
}

// === GLOBAL BALANCE ACCESS ===

static BALANCE: OnceLock<BalanceTable> = OnceLock::new();

/// Get the global balance table (initializes with defaults if not set)
pub fn balance() -> &'static BalanceTable {
    BALANCE.get_or_init(BalanceTable::default)
}

/// Set the global balance table (can only be called once)
///
/// Returns Err with the rejected table if one was already set.
pub fn set_balance(table: BalanceTable) -> std::result::Result<(), BalanceTable> {
    BALANCE.set(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::stance::CombatStance;

    #[test]
    fn test_default_table_is_valid() {
        assert!(BalanceTable::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let table = BalanceTable::parse_toml(
            r#"
            [casualties]
            retreat_penalty = 0.2

            [stances.aggressive]
            attack_mod = 4
            defense_mod = -3
            casualty_multiplier = 1.5
            "#,
        )
        .expect("partial table should parse");

        assert_eq!(table.casualties.retreat_penalty, 0.2);
        assert_eq!(table.casualties.max_loss_per_volley, MAX_LOSS_PER_VOLLEY);
        assert_eq!(table.stances.resolve(CombatStance::Aggressive).attack_mod, 4);
        assert_eq!(table.stances.resolve(CombatStance::Balanced).attack_mod, 0);
        assert_eq!(table.volley.die_sides, DIE_SIDES);
    }

    #[test]
    fn test_rejects_bad_retreat_penalty() {
        let mut table = BalanceTable::default();
        table.casualties.retreat_penalty = 1.5;
        assert!(matches!(table.validate(), Err(CombatError::InvalidBalance(_))));
    }

    #[test]
    fn test_rejects_nan_ratio() {
        let mut table = BalanceTable::default();
        table.theater.dominance_ratio = f64::NAN;
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_carrier_capacity() {
        let result = BalanceTable::parse_toml("[transport]\nsoldiers_per_carrier = 0\n");
        assert!(matches!(result, Err(CombatError::InvalidBalance(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = BalanceTable::parse_toml("[volley\ndie_sides = ");
        assert!(matches!(result, Err(CombatError::Toml(_))));
    }
}
