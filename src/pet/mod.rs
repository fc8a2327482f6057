//! The pet itself
//!
//! - `stats`: bounded stat vector, decay and care action effects
//! - `mood`: discrete mood and hearts derived from stats
//! - `character`: timed animation state machine with input lock
//! - `messages`: speech-bubble lines

pub mod character;
pub mod messages;
pub mod mood;
pub mod stats;

pub use character::{ActionProgress, Character, CharacterState};
pub use messages::MessageKind;
pub use mood::{Mood, health_level, mood};
pub use stats::{ActionKind, StatVector, apply_action, apply_decay};
