//! Local scratch storage (browser LocalStorage on the web host)
//!
//! Holds small string values that do not belong in the pet record: audio
//! preferences and the anonymous session id.

use std::collections::HashMap;
use std::sync::RwLock;

use rand::Rng;

use super::store::Result;
use crate::error::StoreError;

/// Key for the anonymous session identifier
pub const SESSION_ID_KEY: &str = "pocket_pet_session_id";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_SUFFIX_LEN: usize = 9;

/// String key-value store
pub trait LocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryLocalStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryLocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;
        items.remove(key);
        Ok(())
    }
}

/// Stored anonymous session id, created as `session_<now>_<suffix>` on first
/// use. A store that cannot be written still gets a usable id back.
pub fn anonymous_session_id<L: LocalStore + ?Sized, R: Rng>(
    store: &L,
    now_ms: u64,
    rng: &mut R,
) -> String {
    match store.get_item(SESSION_ID_KEY) {
        Ok(Some(id)) if !id.is_empty() => return id,
        Ok(_) => {}
        Err(err) => log::warn!("Could not read session id: {}", err),
    }

    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    let id = format!("session_{}_{}", now_ms, suffix);
    if let Err(err) = store.set_item(SESSION_ID_KEY, &id) {
        log::warn!("Could not store session id: {}", err);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_items_roundtrip() {
        let store = MemoryLocalStore::new();
        assert_eq!(store.get_item("k").unwrap(), None);
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_session_id_created_once() {
        let store = MemoryLocalStore::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let id = anonymous_session_id(&store, 1234, &mut rng);

        let suffix = id.strip_prefix("session_1234_").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));

        assert_eq!(anonymous_session_id(&store, 9999, &mut rng), id);
    }
}
