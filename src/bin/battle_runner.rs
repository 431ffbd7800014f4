//! Headless Battle Runner
//!
//! Resolves a single battle, or previews its odds, and prints the result
//! as JSON or text.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use volley_combat::combat::{
    estimate_with, resolve_battle_with, BattleRequest, BattleResult, CasualtyThreshold,
    CombatStance, Forces, NeverRetreat, RetreatAfter, RetreatPolicy, WinEstimate,
};
use volley_combat::core::{balance, set_balance, AttackType, BalanceTable, Result, Side};

/// Headless Battle Runner - resolve or preview one battle
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Resolve a volley battle, or estimate the attacker's odds")]
struct Args {
    /// Attacking force, e.g. "soldiers=1000,carriers=10"
    #[arg(long)]
    attacker: Forces,

    /// Defending force, e.g. "soldiers=800,stations=5"
    #[arg(long, default_value = "")]
    defender: Forces,

    #[arg(long, default_value = "balanced")]
    attacker_stance: CombatStance,

    #[arg(long, default_value = "balanced")]
    defender_stance: CombatStance,

    /// invasion, guerilla or pirate_defense
    #[arg(long, default_value = "invasion")]
    attack_type: AttackType,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Balance table overriding the shipped defaults
    #[arg(long)]
    balance: Option<PathBuf>,

    /// Estimate win probability over this many trials instead of fighting once
    #[arg(long)]
    estimate: Option<u32>,

    /// Side that withdraws (with --retreat-after or --retreat-at-losses)
    #[arg(long)]
    retreat_side: Option<Side>,

    /// Withdraw after this volley (1 or 2)
    #[arg(long, requires = "retreat_side")]
    retreat_after: Option<usize>,

    /// Withdraw once this fraction of committed units is lost
    #[arg(long, requires = "retreat_side", conflicts_with = "retreat_after")]
    retreat_at_losses: Option<f64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(path) = &args.balance {
        let table = BalanceTable::load_from_toml(path)?;
        if set_balance(table).is_err() {
            tracing::warn!("balance table already initialized, ignoring {}", path.display());
        }
    }
    let balance = balance();

    let seed = args.seed.unwrap_or_else(rand::random);
    let request = BattleRequest::new(args.attacker, args.defender, args.attack_type)
        .with_stances(args.attacker_stance, args.defender_stance);

    if let Some(trials) = args.estimate {
        let estimate = estimate_with(balance, &request, trials, seed)?;
        print_estimate(&estimate, seed, &args.format)?;
        return Ok(());
    }

    let retreat = (args.retreat_side, args.retreat_after, args.retreat_at_losses);
    let mut policy: Box<dyn RetreatPolicy> = match retreat {
        (Some(side), Some(after_volley), _) => Box::new(RetreatAfter { side, after_volley }),
        (Some(side), None, Some(threshold)) => Box::new(CasualtyThreshold { side, threshold }),
        _ => Box::new(NeverRetreat),
    };

    tracing::info!(seed, attack_type = %request.attack_type, "resolving battle");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let result = resolve_battle_with(balance, &request, &mut rng, policy.as_mut())?;
    print_result(&result, seed, &args.format)
}

fn print_estimate(estimate: &WinEstimate, seed: u64, format: &str) -> Result<()> {
    match format {
        "text" => {
            println!("Win Probability Estimate");
            println!("========================");
            println!("Trials: {}", estimate.trials);
            println!("Attacker wins: {}", estimate.attacker_wins);
            println!("Defender wins: {}", estimate.defender_wins);
            println!("Stalemates: {}", estimate.stalemates);
            println!("Attacker win chance: {:.1}%", estimate.attacker_win_fraction * 100.0);
            println!("Seed: {}", seed);
        }
        "json" => println!("{}", serde_json::to_string_pretty(estimate)?),
        other => {
            tracing::warn!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(estimate)?);
        }
    }
    Ok(())
}

fn print_result(result: &BattleResult, seed: u64, format: &str) -> Result<()> {
    match format {
        "text" => {
            println!("Battle Result");
            println!("=============");
            println!("{}", result.summary);
            println!();
            for bonus in result.theater.attacker_bonuses.iter() {
                println!("Attacker holds {} ({})", bonus.name(), bonus.theater().name());
            }
            for bonus in result.theater.defender_bonuses.iter() {
                println!("Defender holds {} ({})", bonus.name(), bonus.theater().name());
            }
            for (i, volley) in result.volleys.iter().enumerate() {
                println!(
                    "Volley {}: {:?} (attacker {:.1} dmg / {} hits, defender {:.1} dmg / {} hits)",
                    i + 1,
                    volley.volley_winner,
                    volley.attacker_damage,
                    volley.attacker_hits(),
                    volley.defender_damage,
                    volley.defender_hits(),
                );
            }
            println!();
            println!(
                "Effectiveness: attacker {:+.1}, defender {:+.1}",
                result.attacker_effectiveness_change, result.defender_effectiveness_change
            );
            println!("Seed: {}", seed);
        }
        "json" => println!("{}", serde_json::to_string_pretty(result)?),
        other => {
            tracing::warn!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(result)?);
        }
    }
    Ok(())
}
