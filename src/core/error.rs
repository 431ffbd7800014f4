use thiserror::Error;

use crate::combat::unit_type::UnitType;

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Negative unit count for {unit:?}: {count}")]
    NegativeUnitCount { unit: UnitType, count: i64 },

    #[error("Malformed force list: {0}")]
    MalformedForces(String),

    #[error("Invasion requires at least one carrier")]
    NoCarriers,

    #[error("{0} requires at least one soldier")]
    NoSoldiers(&'static str),

    #[error("Win probability estimate requires at least one trial")]
    NoTrials,

    #[error("Unknown combat stance: {0}")]
    UnknownStance(String),

    #[error("Unknown attack type: {0}")]
    UnknownAttackType(String),

    #[error("Unknown side: {0}")]
    UnknownSide(String),

    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Invalid balance table: {0}")]
    InvalidBalance(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Balance table parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
