//! Battle resolution
//!
//! A battle is best of three volleys. Forces are committed once up front
//! (transport caps and attack-type rules decide who fights), theater
//! control is settled once, then volleys run in strict sequence with
//! losses applied between them. Either side may withdraw after the first or
//! second volley while the battle is still open.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::constants::{MAX_VOLLEYS, VOLLEYS_TO_WIN};
use crate::combat::forces::Forces;
use crate::combat::stance::CombatStance;
use crate::combat::theater::{analyze_theaters, TheaterControl};
use crate::combat::unit_type::UnitType;
use crate::combat::volley::{resolve_volley, Combatant, VolleyResult, VolleyWinner};
use crate::core::config::{balance, BalanceTable};
use crate::core::error::{CombatError, Result};
use crate::core::types::{AttackType, Side};

/// Final outcome of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    /// Attacker took two volleys without dropping one
    AttackerDecisive,
    AttackerVictory,
    DefenderVictory,
    /// Defender withdrew
    DefenderRetreat,
    /// Attacker withdrew
    AttackerRetreat,
    Stalemate,
}

impl BattleOutcome {
    /// Side holding the field, if any
    pub fn winner(&self) -> Option<Side> {
        match self {
            BattleOutcome::AttackerDecisive
            | BattleOutcome::AttackerVictory
            | BattleOutcome::DefenderRetreat => Some(Side::Attacker),
            BattleOutcome::DefenderVictory | BattleOutcome::AttackerRetreat => Some(Side::Defender),
            BattleOutcome::Stalemate => None,
        }
    }

    /// Did the attacker win the volley contest outright?
    pub fn is_attacker_win(&self) -> bool {
        matches!(
            self,
            BattleOutcome::AttackerDecisive | BattleOutcome::AttackerVictory
        )
    }

    pub fn is_retreat(&self) -> bool {
        matches!(
            self,
            BattleOutcome::DefenderRetreat | BattleOutcome::AttackerRetreat
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            BattleOutcome::AttackerDecisive => "attacker wins decisively",
            BattleOutcome::AttackerVictory => "attacker wins",
            BattleOutcome::DefenderVictory => "defender holds",
            BattleOutcome::DefenderRetreat => "defender retreats",
            BattleOutcome::AttackerRetreat => "attacker retreats",
            BattleOutcome::Stalemate => "stalemate",
        }
    }
}

/// Volleys won by each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VolleyScore {
    pub attacker: u8,
    pub defender: u8,
}

impl VolleyScore {
    pub fn record(&mut self, winner: VolleyWinner) {
        match winner {
            VolleyWinner::Attacker => self.attacker += 1,
            VolleyWinner::Defender => self.defender += 1,
            VolleyWinner::Draw => {}
        }
    }

    /// Has either side reached the winning number of volleys?
    pub fn is_decided(&self) -> bool {
        self.attacker >= VOLLEYS_TO_WIN || self.defender >= VOLLEYS_TO_WIN
    }
}

/// Everything the caller chooses before a battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRequest {
    pub attacker: Forces,
    pub defender: Forces,
    #[serde(default)]
    pub attacker_stance: CombatStance,
    #[serde(default)]
    pub defender_stance: CombatStance,
    #[serde(default)]
    pub attack_type: AttackType,
}

impl BattleRequest {
    /// Request with balanced stances on both sides
    pub fn new(attacker: Forces, defender: Forces, attack_type: AttackType) -> Self {
        Self {
            attacker,
            defender,
            attacker_stance: CombatStance::Balanced,
            defender_stance: CombatStance::Balanced,
            attack_type,
        }
    }

    pub fn with_stances(mut self, attacker: CombatStance, defender: CombatStance) -> Self {
        self.attacker_stance = attacker;
        self.defender_stance = defender;
        self
    }

    pub fn stance(&self, side: Side) -> CombatStance {
        match side {
            Side::Attacker => self.attacker_stance,
            Side::Defender => self.defender_stance,
        }
    }
}

/// State of a battle between volleys, as seen by a retreat policy
#[derive(Debug, Clone, PartialEq)]
pub struct BattleProgress {
    pub volleys_fought: usize,
    pub score: VolleyScore,
    pub attacker_committed: Forces,
    pub defender_committed: Forces,
    pub attacker_losses: Forces,
    pub defender_losses: Forces,
}

impl BattleProgress {
    fn new(attacker_committed: Forces, defender_committed: Forces) -> Self {
        Self {
            volleys_fought: 0,
            score: VolleyScore::default(),
            attacker_committed,
            defender_committed,
            attacker_losses: Forces::new(),
            defender_losses: Forces::new(),
        }
    }

    pub fn committed(&self, side: Side) -> &Forces {
        match side {
            Side::Attacker => &self.attacker_committed,
            Side::Defender => &self.defender_committed,
        }
    }

    pub fn losses(&self, side: Side) -> &Forces {
        match side {
            Side::Attacker => &self.attacker_losses,
            Side::Defender => &self.defender_losses,
        }
    }

    /// Committed units still standing
    pub fn remaining(&self, side: Side) -> Forces {
        self.committed(side).saturating_sub(self.losses(side))
    }

    /// Share of the committed units already lost, 0 when nothing was committed
    pub fn loss_fraction(&self, side: Side) -> f64 {
        match self.committed(side).total_units() {
            0 => 0.0,
            total => self.losses(side).total_units() as f64 / total as f64,
        }
    }

    fn add_losses(&mut self, side: Side, losses: &Forces) {
        let target = match side {
            Side::Attacker => &mut self.attacker_losses,
            Side::Defender => &mut self.defender_losses,
        };
        *target = target.saturating_add(losses);
    }
}

/// Decides whether a side withdraws between volleys
///
/// Only consulted after volley 1 or 2, and only while neither side has won.
pub trait RetreatPolicy {
    fn should_retreat(&mut self, progress: &BattleProgress) -> Option<Side>;
}

/// Fight to the end
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetreat;

impl RetreatPolicy for NeverRetreat {
    fn should_retreat(&mut self, _progress: &BattleProgress) -> Option<Side> {
        None
    }
}

/// Withdraw `side` once `after_volley` volleys have been fought
#[derive(Debug, Clone, Copy)]
pub struct RetreatAfter {
    pub side: Side,
    pub after_volley: usize,
}

impl RetreatPolicy for RetreatAfter {
    fn should_retreat(&mut self, progress: &BattleProgress) -> Option<Side> {
        (progress.volleys_fought == self.after_volley).then_some(self.side)
    }
}

/// Withdraw `side` once it has lost `threshold` of its committed units
#[derive(Debug, Clone, Copy)]
pub struct CasualtyThreshold {
    pub side: Side,
    pub threshold: f64,
}

impl RetreatPolicy for CasualtyThreshold {
    fn should_retreat(&mut self, progress: &BattleProgress) -> Option<Side> {
        (progress.loss_fraction(self.side) >= self.threshold).then_some(self.side)
    }
}

impl<F> RetreatPolicy for F
where
    F: FnMut(&BattleProgress) -> Option<Side>,
{
    fn should_retreat(&mut self, progress: &BattleProgress) -> Option<Side> {
        self(progress)
    }
}

/// A withdrawal and what it cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retreat {
    pub side: Side,
    pub after_volley: usize,
    /// Units lost to the withdrawal itself, already included in the side's losses
    pub penalty: Forces,
}

/// Complete record of one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    pub attack_type: AttackType,
    pub volleys: Vec<VolleyResult>,
    pub volley_score: VolleyScore,
    pub outcome: BattleOutcome,
    pub sectors_captured: u32,
    pub attacker_total_casualties: u64,
    pub defender_total_casualties: u64,
    pub attacker_effectiveness_change: f64,
    pub defender_effectiveness_change: f64,
    pub summary: String,
    pub theater: TheaterControl,
    /// Units that actually fought
    pub attacker_committed: Forces,
    pub defender_committed: Forces,
    pub attacker_losses: Forces,
    pub defender_losses: Forces,
    pub retreat: Option<Retreat>,
}

/// Units that fight, per attack type
///
/// Invasion soldiers beyond carrier capacity stay home, as do all carriers
/// except the attacker's invasion transports. Guerilla raids are soldiers
/// on both sides.
pub fn commit_forces(request: &BattleRequest, balance: &BalanceTable) -> (Forces, Forces) {
    let fighting = |unit: UnitType| unit != UnitType::Carriers;
    let soldiers_only = |unit: UnitType| unit == UnitType::Soldiers;

    match request.attack_type {
        AttackType::Invasion => {
            let capacity = request
                .attacker
                .carrier_capacity(balance.transport.soldiers_per_carrier);
            let mut attacker = request.attacker;
            attacker.soldiers = attacker.soldiers.min(capacity);
            (attacker, request.defender.retain(fighting))
        }
        AttackType::Guerilla => (
            request.attacker.retain(soldiers_only),
            request.defender.retain(soldiers_only),
        ),
        AttackType::PirateDefense => (
            request.attacker.retain(fighting),
            request.defender.retain(fighting),
        ),
    }
}

/// Reject requests that break the caller contract
pub fn validate_request(request: &BattleRequest) -> Result<()> {
    let attack_type = request.attack_type;
    if attack_type.requires_soldiers() && request.attacker.soldiers == 0 {
        return Err(CombatError::NoSoldiers(attack_type.name()));
    }
    if attack_type == AttackType::Invasion && request.attacker.carriers == 0 {
        return Err(CombatError::NoCarriers);
    }
    Ok(())
}

fn derive_outcome(score: VolleyScore, retreat: Option<&Retreat>) -> BattleOutcome {
    if let Some(retreat) = retreat {
        return match retreat.side {
            Side::Attacker => BattleOutcome::AttackerRetreat,
            Side::Defender => BattleOutcome::DefenderRetreat,
        };
    }

    if score.attacker >= VOLLEYS_TO_WIN {
        if score.defender == 0 {
            BattleOutcome::AttackerDecisive
        } else {
            BattleOutcome::AttackerVictory
        }
    } else if score.defender >= VOLLEYS_TO_WIN {
        BattleOutcome::DefenderVictory
    } else {
        BattleOutcome::Stalemate
    }
}

fn sectors_captured(
    attack_type: AttackType,
    outcome: BattleOutcome,
    control: &TheaterControl,
    balance: &BalanceTable,
) -> u32 {
    if !attack_type.can_capture() || outcome.is_retreat() {
        return 0;
    }

    let capture = &balance.capture;
    match outcome {
        BattleOutcome::AttackerDecisive => capture.decisive_sectors,
        BattleOutcome::AttackerVictory => capture.victory_sectors,
        _ if control.attacker_has_ground_superiority => capture.ground_superiority_sectors,
        _ => 0,
    }
}

fn effectiveness_changes(outcome: BattleOutcome, balance: &BalanceTable) -> (f64, f64) {
    let e = &balance.effectiveness;
    match outcome {
        BattleOutcome::AttackerDecisive => (e.decisive_win, e.decisive_loss),
        BattleOutcome::AttackerVictory => (e.win, e.loss),
        BattleOutcome::DefenderVictory => (e.loss, e.win),
        BattleOutcome::DefenderRetreat => (e.win, e.retreat),
        BattleOutcome::AttackerRetreat => (e.retreat, e.win),
        BattleOutcome::Stalemate => (e.stalemate, e.stalemate),
    }
}

fn summarize(result: &BattleResult) -> String {
    let mut summary = format!(
        "{}: {} ({}-{} over {} volley{}). Attacker lost {} units, defender lost {} units.",
        capitalize(result.attack_type.name()),
        result.outcome.describe(),
        result.volley_score.attacker,
        result.volley_score.defender,
        result.volleys.len(),
        if result.volleys.len() == 1 { "" } else { "s" },
        result.attacker_total_casualties,
        result.defender_total_casualties,
    );

    if let Some(retreat) = &result.retreat {
        summary.push_str(&format!(
            " The {} withdrew after volley {}, abandoning {} units to the {}.",
            retreat.side,
            retreat.after_volley,
            retreat.penalty.total_units(),
            retreat.side.opponent()
        ));
    }

    match result.sectors_captured {
        0 => {}
        1 => summary.push_str(" 1 sector captured."),
        n => summary.push_str(&format!(" {} sectors captured.", n)),
    }

    summary
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('_', " "),
        None => String::new(),
    }
}

/// Run a validated battle. Shared by the public entry point and the estimator.
pub(crate) fn run_battle<R, P>(
    balance: &BalanceTable,
    request: &BattleRequest,
    rng: &mut R,
    policy: &mut P,
) -> BattleResult
where
    R: Rng + ?Sized,
    P: RetreatPolicy + ?Sized,
{
    let (attacker_committed, defender_committed) = commit_forces(request, balance);
    let theater = analyze_theaters(
        &attacker_committed,
        &defender_committed,
        &balance.units,
        &balance.theater,
    );
    let attacker_stance = balance.stances.resolve(request.stance(Side::Attacker));
    let defender_stance = balance.stances.resolve(request.stance(Side::Defender));
    let attacker_theater = theater.modifiers(Side::Attacker);
    let defender_theater = theater.modifiers(Side::Defender);

    let mut progress = BattleProgress::new(attacker_committed, defender_committed);
    let mut volleys = Vec::with_capacity(MAX_VOLLEYS);
    let mut retreat = None;

    for number in 1..=MAX_VOLLEYS {
        let attacker = Combatant {
            forces: progress.remaining(Side::Attacker),
            stance: attacker_stance,
            theater: attacker_theater,
        };
        let defender = Combatant {
            forces: progress.remaining(Side::Defender),
            stance: defender_stance,
            theater: defender_theater,
        };

        let volley = resolve_volley(&attacker, &defender, balance, rng);
        progress.add_losses(Side::Attacker, &volley.attacker_losses);
        progress.add_losses(Side::Defender, &volley.defender_losses);
        progress.score.record(volley.volley_winner);
        progress.volleys_fought = number;

        tracing::debug!(
            volley = number,
            winner = ?volley.volley_winner,
            attacker_damage = volley.attacker_damage,
            defender_damage = volley.defender_damage,
            score = ?progress.score,
            "volley resolved"
        );
        volleys.push(volley);

        if progress.score.is_decided() || number == MAX_VOLLEYS {
            break;
        }

        if let Some(side) = policy.should_retreat(&progress) {
            let penalty = progress
                .remaining(side)
                .portion(balance.casualties.retreat_penalty);
            progress.add_losses(side, &penalty);
            tracing::debug!(
                side = %side,
                after_volley = number,
                lost = penalty.total_units(),
                "side withdrew"
            );
            retreat = Some(Retreat {
                side,
                after_volley: number,
                penalty,
            });
            break;
        }
    }

    let outcome = derive_outcome(progress.score, retreat.as_ref());
    let sectors = sectors_captured(request.attack_type, outcome, &theater, balance);
    let (attacker_effectiveness_change, defender_effectiveness_change) =
        effectiveness_changes(outcome, balance);

    let mut result = BattleResult {
        attack_type: request.attack_type,
        volleys,
        volley_score: progress.score,
        outcome,
        sectors_captured: sectors,
        attacker_total_casualties: progress.attacker_losses.total_units(),
        defender_total_casualties: progress.defender_losses.total_units(),
        attacker_effectiveness_change,
        defender_effectiveness_change,
        summary: String::new(),
        theater,
        attacker_committed,
        defender_committed,
        attacker_losses: progress.attacker_losses,
        defender_losses: progress.defender_losses,
        retreat,
    };
    result.summary = summarize(&result);

    tracing::debug!(
        outcome = ?result.outcome,
        sectors = result.sectors_captured,
        "battle resolved"
    );
    result
}

/// Resolve a battle with an explicit balance table and retreat policy
pub fn resolve_battle_with<R, P>(
    balance: &BalanceTable,
    request: &BattleRequest,
    rng: &mut R,
    policy: &mut P,
) -> Result<BattleResult>
where
    R: Rng + ?Sized,
    P: RetreatPolicy + ?Sized,
{
    balance.validate()?;
    validate_request(request)?;
    Ok(run_battle(balance, request, rng, policy))
}

/// Resolve a battle with the global balance table; nobody retreats
pub fn resolve_battle<R: Rng + ?Sized>(
    request: &BattleRequest,
    rng: &mut R,
) -> Result<BattleResult> {
    resolve_battle_with(balance(), request, rng, &mut NeverRetreat)
}
