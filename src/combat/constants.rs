//! Combat system constants - default values for the balance table
//!
//! Nothing in the engine reads these directly. They seed
//! `BalanceTable::default()`, which can be overridden from TOML.

// Transport
pub const SOLDIERS_PER_CARRIER: u64 = 100;

// Dice
pub const DIE_SIDES: u32 = 20;
pub const BASE_DEFENSE_THRESHOLD: i32 = 10;
pub const CRITICAL_MULTIPLIER: f64 = 2.0;

// Shot budget (bounds per-volley work regardless of force size)
pub const UNITS_PER_SHOT: u64 = 10;
pub const MAX_SHOTS_PER_VOLLEY: u32 = 60;

// Best of three
pub const MAX_VOLLEYS: usize = 3;
pub const VOLLEYS_TO_WIN: u8 = 2;

// Theater control
pub const DOMINANCE_RATIO: f64 = 1.5;
pub const SPACE_DOMINANCE_ATTACK: i32 = 2;
pub const ORBITAL_SHIELD_DEFENSE: i32 = 2;

// Casualties
pub const CASUALTY_DAMAGE_SCALE: f64 = 0.2;
pub const MAX_LOSS_PER_VOLLEY: f64 = 0.5;
pub const RETREAT_PENALTY: f64 = 0.15;

// Sector capture
pub const DECISIVE_SECTORS: u32 = 2;
pub const VICTORY_SECTORS: u32 = 1;
pub const GROUND_SUPERIORITY_SECTORS: u32 = 1;

// Effectiveness swings (percentage points)
pub const EFFECTIVENESS_DECISIVE_WIN: f64 = 10.0;
pub const EFFECTIVENESS_WIN: f64 = 5.0;
pub const EFFECTIVENESS_LOSS: f64 = -5.0;
pub const EFFECTIVENESS_DECISIVE_LOSS: f64 = -10.0;
pub const EFFECTIVENESS_STALEMATE: f64 = -2.0;
pub const EFFECTIVENESS_RETREAT: f64 = -10.0;
