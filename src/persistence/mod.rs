//! Saving the pet
//!
//! - `record`: `PetRecord` and partial `PetPatch` updates with merge rules
//! - `store`: `RemoteStore` trait plus `MemoryStore`
//! - `reconciler`: debounced write-behind with merge-on-save
//! - `local`: string scratch store for preferences and the session id

pub mod local;
pub mod reconciler;
pub mod record;
pub mod store;

pub use local::{LocalStore, MemoryLocalStore, anonymous_session_id};
pub use reconciler::{Reconciler, SyncStatus};
pub use record::{DEFAULT_PET_NAME, PetPatch, PetRecord};
pub use store::{MemoryStore, RemoteStore};
