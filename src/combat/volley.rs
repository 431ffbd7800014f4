//! Volley resolution
//!
//! One volley is a simultaneous exchange. Each side rolls a bounded number
//! of d20 shots; every shot stands for a slice of the committed force, so
//! damage scales with force size while the work per volley stays fixed.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::forces::Forces;
use crate::combat::stance::StanceModifiers;
use crate::combat::theater::TheaterModifiers;
use crate::core::config::{BalanceTable, VolleyConfig};

/// How a single shot landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollOutcome {
    /// Natural maximum: always hits, amplified damage
    Critical,
    Hit,
    Miss,
    /// Natural 1: always misses
    Fumble,
}

impl RollOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, RollOutcome::Critical | RollOutcome::Hit)
    }
}

/// One die roll and its classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRoll {
    pub roll: u32,
    pub outcome: RollOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolleyWinner {
    Attacker,
    Defender,
    Draw,
}

/// A side as it enters a volley
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    /// Live committed units
    pub forces: Forces,
    pub stance: StanceModifiers,
    pub theater: TheaterModifiers,
}

/// Outcome of one volley
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolleyResult {
    /// Damage dealt by the attacker
    pub attacker_damage: f64,
    /// Damage dealt by the defender
    pub defender_damage: f64,
    pub attacker_rolls: Vec<ShotRoll>,
    pub defender_rolls: Vec<ShotRoll>,
    pub volley_winner: VolleyWinner,
    /// Units the attacker lost to this volley
    pub attacker_losses: Forces,
    /// Units the defender lost to this volley
    pub defender_losses: Forces,
}

impl VolleyResult {
    pub fn attacker_hits(&self) -> usize {
        self.attacker_rolls.iter().filter(|r| r.outcome.is_hit()).count()
    }

    pub fn defender_hits(&self) -> usize {
        self.defender_rolls.iter().filter(|r| r.outcome.is_hit()).count()
    }
}

/// Shots fired by a side with `combatants` combat units
pub fn shot_count(combatants: u64, config: &VolleyConfig) -> u32 {
    let shots = combatants.div_ceil(config.units_per_shot.max(1));
    shots.min(config.max_shots as u64) as u32
}

/// Classify a natural roll against the target number
pub fn classify_roll(
    roll: u32,
    effective_attack: f64,
    threshold: f64,
    die_sides: u32,
) -> RollOutcome {
    if roll >= die_sides {
        RollOutcome::Critical
    } else if roll <= 1 {
        RollOutcome::Fumble
    } else if roll as f64 + effective_attack >= threshold {
        RollOutcome::Hit
    } else {
        RollOutcome::Miss
    }
}

/// Roll every shot `shooter` gets against `target`
fn fire<R: Rng + ?Sized>(
    shooter: &Combatant,
    target: &Combatant,
    balance: &BalanceTable,
    rng: &mut R,
) -> (f64, Vec<ShotRoll>) {
    let ratings = &balance.units;
    let config = &balance.volley;

    let shots = shot_count(shooter.forces.combatants(ratings), config);
    if shots == 0 {
        return (0.0, Vec::new());
    }

    let damage_per_hit = shooter.forces.attack_power(ratings) / shots as f64;
    let effective_attack = shooter.forces.mean_attack(ratings)
        + shooter.stance.attack_mod as f64
        + shooter.theater.attack_mod as f64;
    let threshold = config.base_defense_threshold as f64
        + target.forces.mean_defense(ratings)
        + target.stance.defense_mod as f64
        + target.theater.defense_mod as f64;

    let mut damage = 0.0;
    let mut rolls = Vec::with_capacity(shots as usize);
    for _ in 0..shots {
        let roll = rng.gen_range(1..=config.die_sides);
        let outcome = classify_roll(roll, effective_attack, threshold, config.die_sides);
        damage += match outcome {
            RollOutcome::Critical => damage_per_hit * config.critical_multiplier,
            RollOutcome::Hit => damage_per_hit,
            RollOutcome::Miss | RollOutcome::Fumble => 0.0,
        };
        rolls.push(ShotRoll { roll, outcome });
    }

    (damage, rolls)
}

/// Units lost by `forces` after taking `damage`
///
/// The loss fraction is damage relative to the force's defense value,
/// scaled by the stance multiplier and capped per volley. Every unit type,
/// including carried transports, loses the same fraction.
pub fn casualties_from_damage(
    forces: &Forces,
    damage: f64,
    casualty_multiplier: f64,
    balance: &BalanceTable,
) -> Forces {
    let value = forces.defense_value(&balance.units);
    if damage <= 0.0 || value <= 0.0 {
        return Forces::new();
    }

    let config = &balance.casualties;
    let fraction = (damage / value * config.damage_scale * casualty_multiplier)
        .min(config.max_loss_per_volley);
    forces.portion(fraction)
}

/// A side that fields combat units beats one that fields none, whatever
/// the dice said; otherwise strictly more damage wins
fn volley_winner(
    attacker_combatants: u64,
    defender_combatants: u64,
    attacker_damage: f64,
    defender_damage: f64,
) -> VolleyWinner {
    match (attacker_combatants, defender_combatants) {
        (0, 0) => VolleyWinner::Draw,
        (_, 0) => VolleyWinner::Attacker,
        (0, _) => VolleyWinner::Defender,
        _ if attacker_damage > defender_damage => VolleyWinner::Attacker,
        _ if defender_damage > attacker_damage => VolleyWinner::Defender,
        _ => VolleyWinner::Draw,
    }
}

/// Resolve exactly one volley between two committed forces
pub fn resolve_volley<R: Rng + ?Sized>(
    attacker: &Combatant,
    defender: &Combatant,
    balance: &BalanceTable,
    rng: &mut R,
) -> VolleyResult {
    let (attacker_damage, attacker_rolls) = fire(attacker, defender, balance, rng);
    let (defender_damage, defender_rolls) = fire(defender, attacker, balance, rng);

    let volley_winner = volley_winner(
        attacker.forces.combatants(&balance.units),
        defender.forces.combatants(&balance.units),
        attacker_damage,
        defender_damage,
    );

    let attacker_losses = casualties_from_damage(
        &attacker.forces,
        defender_damage,
        attacker.stance.casualty_multiplier,
        balance,
    );
    let defender_losses = casualties_from_damage(
        &defender.forces,
        attacker_damage,
        defender.stance.casualty_multiplier,
        balance,
    );

    VolleyResult {
        attacker_damage,
        defender_damage,
        attacker_rolls,
        defender_rolls,
        volley_winner,
        attacker_losses,
        defender_losses,
    }
}
