//! Combat resolution engine
//!
//! Two force compositions and their stances go in; a best-of-three volley
//! battle comes out. Randomness is always passed in by the caller.

pub mod constants;
pub mod estimate;
pub mod forces;
pub mod resolution;
pub mod stance;
pub mod theater;
pub mod unit_type;
pub mod volley;

pub use estimate::{estimate_win_probability, estimate_with, WinEstimate, DEFAULT_PREVIEW_TRIALS};
pub use forces::Forces;
pub use resolution::{
    commit_forces, resolve_battle, resolve_battle_with, validate_request, BattleOutcome,
    BattleProgress, BattleRequest, BattleResult, CasualtyThreshold, NeverRetreat, Retreat,
    RetreatAfter, RetreatPolicy, VolleyScore,
};
pub use stance::{CombatStance, StanceModifiers, StanceProfile, StanceTable};
pub use theater::{analyze_theaters, SpecialEffect, TheaterBonus, TheaterControl, TheaterModifiers};
pub use unit_type::{Theater, UnitRating, UnitRatingTable, UnitType};
pub use volley::{resolve_volley, Combatant, RollOutcome, ShotRoll, VolleyResult, VolleyWinner};
