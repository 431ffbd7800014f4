//! Volley Combat - battle resolution for a persistent-turn empire strategy game

pub mod combat;
pub mod core;
