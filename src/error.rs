//! Error types surfaced by the pet core.
//!
//! Simulation code never fails: out-of-range values are clamped. Errors only
//! appear at the edges (remote store, local store, configuration) and for
//! player requests that are rejected outright.

use thiserror::Error;

/// Failures reported by a remote or local store.
///
/// "No record" is not an error; stores return `Ok(None)` for it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected the request: {0}")]
    Rejected(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store lock was poisoned")]
    LockPoisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// The character is mid-animation and input is locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("character is busy animating")]
    Busy,
}

/// Reasons a care action request is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("character is busy animating")]
    Busy,

    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientCoins { needed: u32, available: u32 },

    #[error("a mini-game is in progress")]
    MiniGameActive,
}

impl From<CharacterError> for ActionError {
    fn from(err: CharacterError) -> Self {
        match err {
            CharacterError::Busy => ActionError::Busy,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
