pub mod config;
pub mod error;
pub mod types;

pub use config::{balance, set_balance, BalanceTable};
pub use error::{CombatError, Result};
pub use types::{AttackType, Side};
