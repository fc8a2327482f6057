//! Pocket Pet - a virtual pet that lives on coins earned in arcade mini-games
//!
//! Core modules:
//! - `pet`: stats, decay, mood and the character animation machine
//! - `minigame`: Catch-Food, Click-Food and Food-Jump on a shared engine
//! - `economy`: coins and best scores
//! - `persistence`: pet record, remote store, debounced reconciler, local store
//! - `session`: the real-time driver tying it all together
//! - `preferences` / `config`: audio preferences and session tuning
//!
//! Nothing here reads a clock. Hosts pass `now_ms` to the session and a frame
//! delta in seconds to mini-games, which makes every run reproducible.

pub mod config;
pub mod economy;
pub mod error;
pub mod minigame;
pub mod persistence;
pub mod pet;
pub mod preferences;
pub mod session;

pub use config::PetConfig;
pub use economy::Economy;
pub use error::{ActionError, CharacterError, ConfigError, StoreError};
pub use minigame::{GameEvent, GameId, MiniGame};
pub use persistence::{MemoryStore, PetPatch, PetRecord, Reconciler, RemoteStore, SyncStatus};
pub use pet::{ActionKind, Mood, StatVector};
pub use preferences::Preferences;
pub use session::{Session, SessionEvent};
