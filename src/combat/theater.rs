//! Theater control analysis
//!
//! Before the first volley each side's composition is compared in the
//! space, orbital and ground theaters. Overwhelming presence in a theater
//! earns a named bonus that lasts for the whole battle.

use serde::{Deserialize, Serialize};

use crate::combat::forces::Forces;
use crate::combat::unit_type::{Theater, UnitRatingTable, UnitType};
use crate::core::config::TheaterConfig;
use crate::core::types::Side;

pub const SPACE_DOMINANCE: &str = "Space Dominance";
pub const ORBITAL_SHIELD: &str = "Orbital Shield";
pub const GROUND_SUPERIORITY: &str = "Ground Superiority";

/// Effect that bypasses the numeric modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialEffect {
    /// Holder may capture sectors without winning the volley majority
    GroundSuperiority,
}

/// Bonus earned by controlling a theater
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TheaterBonus {
    Modifier {
        theater: Theater,
        name: String,
        attack_mod: i32,
        defense_mod: i32,
    },
    SpecialEffect {
        theater: Theater,
        name: String,
        effect: SpecialEffect,
    },
}

impl TheaterBonus {
    pub fn name(&self) -> &str {
        match self {
            TheaterBonus::Modifier { name, .. } | TheaterBonus::SpecialEffect { name, .. } => name,
        }
    }

    pub fn theater(&self) -> Theater {
        match self {
            TheaterBonus::Modifier { theater, .. }
            | TheaterBonus::SpecialEffect { theater, .. } => *theater,
        }
    }

    pub fn grants(&self, effect: SpecialEffect) -> bool {
        matches!(self, TheaterBonus::SpecialEffect { effect: e, .. } if *e == effect)
    }
}

/// Summed numeric theater modifiers for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TheaterModifiers {
    pub attack_mod: i32,
    pub defense_mod: i32,
}

/// Strength of both sides in one theater
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TheaterStrength {
    pub theater: Theater,
    pub attacker: f64,
    pub defender: f64,
}

/// Result of the pre-battle theater comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TheaterControl {
    pub strengths: Vec<TheaterStrength>,
    pub attacker_bonuses: Vec<TheaterBonus>,
    pub defender_bonuses: Vec<TheaterBonus>,
    pub attacker_has_ground_superiority: bool,
}

impl TheaterControl {
    pub fn bonuses(&self, side: Side) -> &[TheaterBonus] {
        match side {
            Side::Attacker => &self.attacker_bonuses,
            Side::Defender => &self.defender_bonuses,
        }
    }

    /// Numeric bonuses for one side, stacked additively
    pub fn modifiers(&self, side: Side) -> TheaterModifiers {
        self.bonuses(side)
            .iter()
            .fold(TheaterModifiers::default(), |mut acc, bonus| {
                if let TheaterBonus::Modifier {
                    attack_mod,
                    defense_mod,
                    ..
                } = bonus
                {
                    acc.attack_mod += attack_mod;
                    acc.defense_mod += defense_mod;
                }
                acc
            })
    }
}

/// Does `unit` count toward `side`'s presence in `theater`?
///
/// Stations defend the ground theater as well as orbit, but only for the
/// side holding the sector.
fn counts_in(unit: UnitType, theater: Theater, side: Side) -> bool {
    unit.theater() == Some(theater)
        || (theater == Theater::Ground && side == Side::Defender && unit == UnitType::Stations)
}

/// Presence of one side in one theater: count x (TAR + DEF) per unit
pub fn theater_strength(
    forces: &Forces,
    theater: Theater,
    side: Side,
    ratings: &UnitRatingTable,
) -> f64 {
    forces
        .iter()
        .filter(|(unit, _)| counts_in(*unit, theater, side))
        .map(|(unit, count)| count as f64 * ratings.rating(unit).theater_weight() as f64)
        .sum()
}

/// Does `strength` overwhelm `opposing` by at least `ratio`?
fn dominates(strength: f64, opposing: f64, ratio: f64) -> bool {
    strength > 0.0 && (opposing <= 0.0 || strength >= opposing * ratio)
}

fn bonus_for(theater: Theater, config: &TheaterConfig) -> TheaterBonus {
    match theater {
        Theater::Space => TheaterBonus::Modifier {
            theater,
            name: SPACE_DOMINANCE.to_string(),
            attack_mod: config.space_dominance_attack,
            defense_mod: 0,
        },
        Theater::Orbital => TheaterBonus::Modifier {
            theater,
            name: ORBITAL_SHIELD.to_string(),
            attack_mod: 0,
            defense_mod: config.orbital_shield_defense,
        },
        Theater::Ground => TheaterBonus::SpecialEffect {
            theater,
            name: GROUND_SUPERIORITY.to_string(),
            effect: SpecialEffect::GroundSuperiority,
        },
    }
}

/// Compare both sides theater by theater and hand out bonuses
pub fn analyze_theaters(
    attacker: &Forces,
    defender: &Forces,
    ratings: &UnitRatingTable,
    config: &TheaterConfig,
) -> TheaterControl {
    let mut control = TheaterControl::default();

    for theater in Theater::ALL {
        let a = theater_strength(attacker, theater, Side::Attacker, ratings);
        let d = theater_strength(defender, theater, Side::Defender, ratings);
        control.strengths.push(TheaterStrength {
            theater,
            attacker: a,
            defender: d,
        });

        if dominates(a, d, config.dominance_ratio) {
            tracing::trace!(
                theater = theater.name(),
                attacker = a,
                defender = d,
                "attacker controls theater"
            );
            control.attacker_bonuses.push(bonus_for(theater, config));
        } else if dominates(d, a, config.dominance_ratio) {
            tracing::trace!(
                theater = theater.name(),
                attacker = a,
                defender = d,
                "defender controls theater"
            );
            control.defender_bonuses.push(bonus_for(theater, config));
        }
    }

    control.attacker_has_ground_superiority = control
        .attacker_bonuses
        .iter()
        .any(|b| b.grants(SpecialEffect::GroundSuperiority));

    control
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(attacker: &Forces, defender: &Forces) -> TheaterControl {
        analyze_theaters(
            attacker,
            defender,
            &UnitRatingTable::default(),
            &TheaterConfig::default(),
        )
    }

    fn names(bonuses: &[TheaterBonus]) -> Vec<&str> {
        bonuses.iter().map(|b| b.name()).collect()
    }

    #[test]
    fn test_even_forces_earn_nothing() {
        let forces = Forces::new()
            .with(UnitType::Soldiers, 500)
            .with(UnitType::LightCruisers, 20)
            .with(UnitType::Fighters, 40);
        let control = analyze(&forces, &forces);
        assert!(control.attacker_bonuses.is_empty());
        assert!(control.defender_bonuses.is_empty());
        assert!(!control.attacker_has_ground_superiority);
        assert_eq!(control.modifiers(Side::Attacker), TheaterModifiers::default());
    }

    #[test]
    fn test_space_dominance_grants_attack() {
        let attacker = Forces::new().with(UnitType::HeavyCruisers, 30);
        let defender = Forces::new().with(UnitType::LightCruisers, 10);
        let control = analyze(&attacker, &defender);

        assert_eq!(names(&control.attacker_bonuses), vec![SPACE_DOMINANCE]);
        assert_eq!(control.modifiers(Side::Attacker).attack_mod, 2);
        assert_eq!(control.modifiers(Side::Attacker).defense_mod, 0);
    }

    #[test]
    fn test_ratio_threshold_is_inclusive() {
        // 15 vs 10 light cruisers: exactly 1.5x
        let attacker = Forces::new().with(UnitType::LightCruisers, 15);
        let defender = Forces::new().with(UnitType::LightCruisers, 10);
        assert_eq!(analyze(&attacker, &defender).attacker_bonuses.len(), 1);

        let attacker = Forces::new().with(UnitType::LightCruisers, 14);
        assert!(analyze(&attacker, &defender).attacker_bonuses.is_empty());
    }

    #[test]
    fn test_stations_shield_defender() {
        let attacker = Forces::new().with(UnitType::Fighters, 10);
        let defender = Forces::new().with(UnitType::Stations, 20);
        let control = analyze(&attacker, &defender);

        assert!(names(&control.defender_bonuses).contains(&ORBITAL_SHIELD));
        assert_eq!(control.modifiers(Side::Defender).defense_mod, 2);
    }

    #[test]
    fn test_stations_hold_the_ground() {
        // 100 soldiers (weight 2) vs 30 stations (weight 13 each)
        let attacker = Forces::new().with(UnitType::Soldiers, 100);
        let defender = Forces::new().with(UnitType::Stations, 30);
        let control = analyze(&attacker, &defender);
        assert!(!control.attacker_has_ground_superiority);
        assert!(names(&control.defender_bonuses).contains(&GROUND_SUPERIORITY));
    }

    #[test]
    fn test_ground_superiority_flag() {
        let attacker = Forces::new().with(UnitType::Soldiers, 1000);
        let defender = Forces::new().with(UnitType::Soldiers, 100);
        let control = analyze(&attacker, &defender);
        assert!(control.attacker_has_ground_superiority);
        // Special effects add no numeric modifiers
        assert_eq!(control.modifiers(Side::Attacker), TheaterModifiers::default());
    }

    #[test]
    fn test_uncontested_theater_goes_to_present_side() {
        let attacker = Forces::new().with(UnitType::Soldiers, 1);
        let control = analyze(&attacker, &Forces::new());
        assert!(control.attacker_has_ground_superiority);
        assert_eq!(control.attacker_bonuses.len(), 1);
    }

    #[test]
    fn test_bonuses_stack_across_theaters() {
        let attacker = Forces::new()
            .with(UnitType::HeavyCruisers, 50)
            .with(UnitType::Fighters, 200)
            .with(UnitType::Soldiers, 2000);
        let defender = Forces::new().with(UnitType::Soldiers, 100);
        let control = analyze(&attacker, &defender);

        assert_eq!(control.attacker_bonuses.len(), 3);
        let mods = control.modifiers(Side::Attacker);
        assert_eq!(mods.attack_mod, 2);
        assert_eq!(mods.defense_mod, 2);
        assert!(control.attacker_has_ground_superiority);
    }

    #[test]
    fn test_empty_battle_reports_all_theaters() {
        let control = analyze(&Forces::new(), &Forces::new());
        assert_eq!(control.strengths.len(), 3);
        assert!(control.attacker_bonuses.is_empty());
        assert!(control.defender_bonuses.is_empty());
    }

    #[test]
    fn test_presence_follows_unit_catalog() {
        let ratings = UnitRatingTable::default();
        for unit in UnitType::ALL {
            let forces = Forces::new().with(unit, 10);
            for theater in Theater::ALL {
                let strength = theater_strength(&forces, theater, Side::Attacker, &ratings);
                let expected =
                    unit.theater() == Some(theater) && ratings.rating(unit).is_combatant();
                assert_eq!(strength > 0.0, expected, "{} in {}", unit, theater.name());
            }
        }
    }

    #[test]
    fn test_only_defending_stations_count_on_the_ground() {
        let ratings = UnitRatingTable::default();
        let stations = Forces::new().with(UnitType::Stations, 4);
        assert_eq!(theater_strength(&stations, Theater::Ground, Side::Attacker, &ratings), 0.0);
        assert_eq!(theater_strength(&stations, Theater::Ground, Side::Defender, &ratings), 52.0);
        assert_eq!(theater_strength(&stations, Theater::Orbital, Side::Attacker, &ratings), 52.0);
    }

    #[test]
    fn test_bonus_reports_its_theater() {
        let attacker = Forces::new().with(UnitType::HeavyCruisers, 30);
        let control = analyze(&attacker, &Forces::new());
        assert_eq!(control.attacker_bonuses[0].theater(), Theater::Space);
    }
}
