//! Audio preferences
//!
//! Persisted separately from the pet record in the local store.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::persistence::LocalStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub music_enabled: bool,
    pub sfx_enabled: bool,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            music_enabled: true,
            sfx_enabled: true,
            music_volume: 0.5,
            sfx_volume: 0.5,
        }
    }
}

impl Preferences {
    /// Local store key
    pub const STORAGE_KEY: &'static str = "pocket_pet_preferences";

    /// Volumes pulled back into range
    pub fn sanitized(mut self) -> Self {
        self.music_volume = sanitize_volume(self.music_volume);
        self.sfx_volume = sanitize_volume(self.sfx_volume);
        self
    }

    /// Volume to actually play music at (0 when muted)
    pub fn effective_music_volume(&self) -> f32 {
        if self.music_enabled { self.music_volume } else { 0.0 }
    }

    pub fn effective_sfx_volume(&self) -> f32 {
        if self.sfx_enabled { self.sfx_volume } else { 0.0 }
    }

    pub fn toggle_music(&mut self) -> bool {
        self.music_enabled = !self.music_enabled;
        self.music_enabled
    }

    pub fn toggle_sfx(&mut self) -> bool {
        self.sfx_enabled = !self.sfx_enabled;
        self.sfx_enabled
    }

    /// Load from the local store, falling back to defaults on anything odd
    pub fn load<L: LocalStore + ?Sized>(store: &L) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Preferences>(&json) {
                Ok(prefs) => {
                    log::info!("Loaded preferences");
                    return prefs.sanitized();
                }
                Err(err) => log::warn!("Ignoring invalid preferences: {}", err),
            },
            Ok(None) => {}
            Err(err) => log::warn!("Could not read preferences: {}", err),
        }

        log::info!("Using default preferences");
        Self::default()
    }

    pub fn save<L: LocalStore + ?Sized>(&self, store: &L) -> Result<(), StoreError> {
        let json = serde_json::to_string(self)?;
        store.set_item(Self::STORAGE_KEY, &json)?;
        log::info!("Preferences saved");
        Ok(())
    }
}

fn sanitize_volume(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryLocalStore;

    #[test]
    fn test_save_load_roundtrip() {
        let store = MemoryLocalStore::new();
        let mut prefs = Preferences::default();
        prefs.toggle_music();
        prefs.sfx_volume = 0.25;
        prefs.save(&store).unwrap();

        let loaded = Preferences::load(&store);
        assert_eq!(loaded, prefs);
        assert_eq!(loaded.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let store = MemoryLocalStore::new();
        store.set_item(Preferences::STORAGE_KEY, "{not json").unwrap();
        assert_eq!(Preferences::load(&store), Preferences::default());
    }

    #[test]
    fn test_partial_json_fills_defaults_and_clamps() {
        let store = MemoryLocalStore::new();
        store
            .set_item(Preferences::STORAGE_KEY, r#"{"sfx_volume": 3.0}"#)
            .unwrap();
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.sfx_volume, 1.0);
        assert!(prefs.music_enabled);
    }
}
