//! Force compositions: a unit count per unit type

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combat::unit_type::{UnitRatingTable, UnitType};
use crate::core::error::{CombatError, Result};

/// Unit counts for one side of a battle
///
/// Value type. The engine copies what it needs and hands back losses
/// separately; a caller's `Forces` is never modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Forces {
    pub soldiers: u64,
    pub fighters: u64,
    pub stations: u64,
    pub light_cruisers: u64,
    pub heavy_cruisers: u64,
    pub carriers: u64,
}

impl Forces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from signed counts, rejecting negatives
    ///
    /// Unit types that are not mentioned stay at zero; repeated entries overwrite.
    pub fn from_counts<I>(counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (UnitType, i64)>,
    {
        let mut forces = Forces::new();
        for (unit, count) in counts {
            let count =
                u64::try_from(count).map_err(|_| CombatError::NegativeUnitCount { unit, count })?;
            forces.set(unit, count);
        }
        Ok(forces)
    }

    /// Builder-style setter
    pub fn with(mut self, unit: UnitType, count: u64) -> Self {
        self.set(unit, count);
        self
    }

    pub fn get(&self, unit: UnitType) -> u64 {
        match unit {
            UnitType::Soldiers => self.soldiers,
            UnitType::Fighters => self.fighters,
            UnitType::Stations => self.stations,
            UnitType::LightCruisers => self.light_cruisers,
            UnitType::HeavyCruisers => self.heavy_cruisers,
            UnitType::Carriers => self.carriers,
        }
    }

    pub fn set(&mut self, unit: UnitType, count: u64) {
        match unit {
            UnitType::Soldiers => self.soldiers = count,
            UnitType::Fighters => self.fighters = count,
            UnitType::Stations => self.stations = count,
            UnitType::LightCruisers => self.light_cruisers = count,
            UnitType::HeavyCruisers => self.heavy_cruisers = count,
            UnitType::Carriers => self.carriers = count,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitType, u64)> + '_ {
        UnitType::ALL.into_iter().map(move |unit| (unit, self.get(unit)))
    }

    pub fn total_units(&self) -> u64 {
        self.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_units() == 0
    }

    /// Soldiers this force's carriers can land
    pub fn carrier_capacity(&self, soldiers_per_carrier: u64) -> u64 {
        self.carriers.saturating_mul(soldiers_per_carrier)
    }

    /// Number of units that carry a combat rating
    pub fn combatants(&self, ratings: &UnitRatingTable) -> u64 {
        self.iter()
            .filter(|(unit, _)| ratings.rating(*unit).is_combatant())
            .map(|(_, count)| count)
            .sum()
    }

    /// Sum of count x TAR
    pub fn attack_power(&self, ratings: &UnitRatingTable) -> f64 {
        self.iter()
            .map(|(unit, count)| count as f64 * ratings.rating(unit).attack as f64)
            .sum()
    }

    /// Sum of count x DEF
    pub fn defense_value(&self, ratings: &UnitRatingTable) -> f64 {
        self.iter()
            .map(|(unit, count)| count as f64 * ratings.rating(unit).defense as f64)
            .sum()
    }

    /// Mean TAR across combat units, 0 when there are none
    pub fn mean_attack(&self, ratings: &UnitRatingTable) -> f64 {
        match self.combatants(ratings) {
            0 => 0.0,
            n => self.attack_power(ratings) / n as f64,
        }
    }

    /// Mean DEF across combat units, 0 when there are none
    pub fn mean_defense(&self, ratings: &UnitRatingTable) -> f64 {
        match self.combatants(ratings) {
            0 => 0.0,
            n => self.defense_value(ratings) / n as f64,
        }
    }

    /// Per-type difference, floored at zero
    pub fn saturating_sub(&self, other: &Forces) -> Forces {
        let mut out = Forces::new();
        for (unit, count) in self.iter() {
            out.set(unit, count.saturating_sub(other.get(unit)));
        }
        out
    }

    /// Per-type sum
    pub fn saturating_add(&self, other: &Forces) -> Forces {
        let mut out = Forces::new();
        for (unit, count) in self.iter() {
            out.set(unit, count.saturating_add(other.get(unit)));
        }
        out
    }

    /// `fraction` of every unit type, rounded, never more than is present
    pub fn portion(&self, fraction: f64) -> Forces {
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        let mut out = Forces::new();
        for (unit, count) in self.iter() {
            let lost = (count as f64 * fraction).round() as u64;
            out.set(unit, lost.min(count));
        }
        out
    }

    /// Keep only the listed unit types
    pub fn retain(&self, keep: impl Fn(UnitType) -> bool) -> Forces {
        let mut out = Forces::new();
        for (unit, count) in self.iter().filter(|(unit, _)| keep(*unit)) {
            out.set(unit, count);
        }
        out
    }

    /// True when no unit type exceeds the matching count in `other`
    pub fn fits_within(&self, other: &Forces) -> bool {
        self.iter().all(|(unit, count)| count <= other.get(unit))
    }
}

/// Parses `soldiers=1000,carriers=10`; unlisted unit types are zero
impl FromStr for Forces {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self> {
        let mut counts = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (unit, count) = entry
                .split_once('=')
                .ok_or_else(|| CombatError::MalformedForces(entry.to_string()))?;
            let unit: UnitType = unit.trim().parse()?;
            let count: i64 = count
                .trim()
                .parse()
                .map_err(|_| CombatError::MalformedForces(entry.to_string()))?;
            counts.push((unit, count));
        }
        Forces::from_counts(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative_counts() {
        let result = Forces::from_counts([(UnitType::Soldiers, 100), (UnitType::Fighters, -3)]);
        assert!(matches!(
            result,
            Err(CombatError::NegativeUnitCount {
                unit: UnitType::Fighters,
                count: -3
            })
        ));
    }

    #[test]
    fn test_from_counts_sets_listed_units() {
        let forces =
            Forces::from_counts([(UnitType::Soldiers, 500), (UnitType::Carriers, 5)]).unwrap();
        assert_eq!(forces.soldiers, 500);
        assert_eq!(forces.carriers, 5);
        assert_eq!(forces.total_units(), 505);
    }

    #[test]
    fn test_carrier_capacity() {
        let forces = Forces::new().with(UnitType::Carriers, 10);
        assert_eq!(forces.carrier_capacity(100), 1000);
        assert_eq!(Forces::new().carrier_capacity(100), 0);
    }

    #[test]
    fn test_carriers_are_not_combatants() {
        let ratings = UnitRatingTable::default();
        let forces = Forces::new()
            .with(UnitType::Soldiers, 100)
            .with(UnitType::Carriers, 50);
        assert_eq!(forces.combatants(&ratings), 100);
        assert_eq!(forces.mean_attack(&ratings), 1.0);
    }

    #[test]
    fn test_mean_ratings_are_weighted_by_count() {
        let ratings = UnitRatingTable::default();
        let forces = Forces::new()
            .with(UnitType::Soldiers, 9)
            .with(UnitType::HeavyCruisers, 1);
        // (9 * 1 + 1 * 10) / 10
        assert!((forces.mean_attack(&ratings) - 1.9).abs() < 1e-9);
        // (9 * 1 + 1 * 8) / 10
        assert!((forces.mean_defense(&ratings) - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_empty_force_means_are_zero() {
        let ratings = UnitRatingTable::default();
        assert_eq!(Forces::new().mean_attack(&ratings), 0.0);
        assert_eq!(Forces::new().mean_defense(&ratings), 0.0);
    }

    #[test]
    fn test_portion_never_exceeds_count() {
        let forces = Forces::new().with(UnitType::Soldiers, 3).with(UnitType::Fighters, 1000);
        let lost = forces.portion(0.15);
        assert_eq!(lost.soldiers, 0);
        assert_eq!(lost.fighters, 150);
        assert!(forces.portion(7.0).fits_within(&forces));
        assert!(forces.portion(f64::NAN).is_empty());
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Forces::new().with(UnitType::Soldiers, 10);
        let b = Forces::new().with(UnitType::Soldiers, 25);
        assert_eq!(a.saturating_sub(&b).soldiers, 0);
        assert_eq!(b.saturating_sub(&a).soldiers, 15);
    }

    #[test]
    fn test_retain_filters_units() {
        let forces = Forces::new()
            .with(UnitType::Soldiers, 10)
            .with(UnitType::Stations, 2);
        let ground = forces.retain(|unit| unit == UnitType::Soldiers);
        assert_eq!(ground.soldiers, 10);
        assert_eq!(ground.stations, 0);
    }

    #[test]
    fn test_parse_force_list() {
        let forces: Forces = "soldiers=1000, carriers=10,heavy-cruisers=3".parse().unwrap();
        assert_eq!(forces.soldiers, 1000);
        assert_eq!(forces.carriers, 10);
        assert_eq!(forces.heavy_cruisers, 3);
        assert_eq!("".parse::<Forces>().unwrap(), Forces::new());
    }

    #[test]
    fn test_parse_force_list_errors() {
        assert!(matches!("soldiers".parse::<Forces>(), Err(CombatError::MalformedForces(_))));
        assert!(matches!("soldiers=ten".parse::<Forces>(), Err(CombatError::MalformedForces(_))));
        assert!(matches!("titans=4".parse::<Forces>(), Err(CombatError::UnknownUnitType(_))));
        assert!(matches!(
            "soldiers=-4".parse::<Forces>(),
            Err(CombatError::NegativeUnitCount { .. })
        ));
    }

    #[test]
    fn test_serde_defaults_missing_units() {
        let forces: Forces = serde_json::from_str(r#"{"soldiers": 40}"#).unwrap();
        assert_eq!(forces.soldiers, 40);
        assert_eq!(forces.carriers, 0);
        assert!(serde_json::from_str::<Forces>(r#"{"soldiers": -1}"#).is_err());
    }
}
