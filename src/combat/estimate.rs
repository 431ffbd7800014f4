//! Monte Carlo win-probability preview
//!
//! Runs the same battle many times on the rayon pool. Each trial gets its
//! own ChaCha stream derived from the base seed and the trial index, so the
//! estimate depends only on the seed, never on thread scheduling.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::resolution::{
    run_battle, validate_request, BattleOutcome, BattleRequest, NeverRetreat,
};
use crate::core::config::{balance, BalanceTable};
use crate::core::error::{CombatError, Result};
use crate::core::types::Side;

/// Trial count used by interactive previews
pub const DEFAULT_PREVIEW_TRIALS: u32 = 50;

/// Tally of many simulated battles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinEstimate {
    pub trials: u32,
    pub attacker_wins: u32,
    pub defender_wins: u32,
    pub stalemates: u32,
    /// attacker_wins / trials
    pub attacker_win_fraction: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    attacker: u32,
    defender: u32,
    stalemate: u32,
}

impl Tally {
    fn from_outcome(outcome: BattleOutcome) -> Self {
        let mut tally = Tally::default();
        if outcome.is_attacker_win() {
            tally.attacker = 1;
        } else if outcome.winner() == Some(Side::Defender) {
            tally.defender = 1;
        } else {
            tally.stalemate = 1;
        }
        tally
    }

    fn merge(self, other: Tally) -> Tally {
        Tally {
            attacker: self.attacker + other.attacker,
            defender: self.defender + other.defender,
            stalemate: self.stalemate + other.stalemate,
        }
    }
}

/// RNG for one trial: the base seed, on the trial's own stream
fn trial_rng(seed: u64, trial: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    rng
}

/// Estimate with an explicit balance table and base seed
pub fn estimate_with(
    balance: &BalanceTable,
    request: &BattleRequest,
    trials: u32,
    seed: u64,
) -> Result<WinEstimate> {
    if trials == 0 {
        return Err(CombatError::NoTrials);
    }
    balance.validate()?;
    validate_request(request)?;

    let tally = (0..trials)
        .into_par_iter()
        .map(|trial| {
            let mut rng = trial_rng(seed, trial);
            let result = run_battle(balance, request, &mut rng, &mut NeverRetreat);
            Tally::from_outcome(result.outcome)
        })
        .reduce(Tally::default, Tally::merge);

    let estimate = WinEstimate {
        trials,
        attacker_wins: tally.attacker,
        defender_wins: tally.defender,
        stalemates: tally.stalemate,
        attacker_win_fraction: tally.attacker as f64 / trials as f64,
    };

    tracing::info!(
        trials,
        attacker_wins = estimate.attacker_wins,
        defender_wins = estimate.defender_wins,
        stalemates = estimate.stalemates,
        "win probability estimated"
    );
    Ok(estimate)
}

/// Fraction of `trials` simulated battles the attacker wins
///
/// Uses the global balance table and a fresh random seed. Advisory only:
/// the committed battle is resolved separately with its own draw.
pub fn estimate_win_probability(request: &BattleRequest, trials: u32) -> Result<f64> {
    let seed: u64 = rand::random();
    estimate_with(balance(), request, trials, seed).map(|e| e.attacker_win_fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::forces::Forces;
    use crate::combat::unit_type::UnitType;
    use crate::core::types::AttackType;

    fn skirmish(attacker: u64, defender: u64) -> BattleRequest {
        BattleRequest::new(
            Forces::new().with(UnitType::Soldiers, attacker),
            Forces::new().with(UnitType::Soldiers, defender),
            AttackType::PirateDefense,
        )
    }

    #[test]
    fn test_zero_trials_rejected() {
        let result = estimate_with(&BalanceTable::default(), &skirmish(10, 10), 0, 1);
        assert!(matches!(result, Err(CombatError::NoTrials)));
    }

    #[test]
    fn test_invalid_request_rejected() {
        let request = BattleRequest::new(Forces::new(), Forces::new(), AttackType::Invasion);
        assert!(estimate_with(&BalanceTable::default(), &request, 10, 1).is_err());
    }

    #[test]
    fn test_same_seed_same_estimate() {
        let balance = BalanceTable::default();
        let request = skirmish(500, 480);
        let first = estimate_with(&balance, &request, 64, 42).unwrap();
        let second = estimate_with(&balance, &request, 64, 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tallies_cover_every_trial() {
        let estimate =
            estimate_with(&BalanceTable::default(), &skirmish(300, 300), 100, 9).unwrap();
        assert_eq!(
            estimate.attacker_wins + estimate.defender_wins + estimate.stalemates,
            estimate.trials
        );
        assert!((0.0..=1.0).contains(&estimate.attacker_win_fraction));
    }

    #[test]
    fn test_trial_streams_differ() {
        use rand::Rng;
        let a: u64 = trial_rng(7, 0).gen();
        let b: u64 = trial_rng(7, 1).gen();
        assert_ne!(a, b);
    }

    #[test]
    fn test_overwhelming_force_nearly_certain() {
        let p = estimate_win_probability(&skirmish(10_000, 1_000), DEFAULT_PREVIEW_TRIALS).unwrap();
        assert!(p > 0.95, "p = {}", p);
    }
}
