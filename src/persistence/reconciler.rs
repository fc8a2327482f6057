//! Write-behind cache in front of the remote store
//!
//! The reconciler owns the working copy of the pet record. Mutations are
//! applied to it at once and collected into a single dirty patch; the patch
//! goes out after a debounce delay (or when explicitly flushed) as one
//! read-merge-upsert against whatever the store holds at that moment.
//!
//! - Best scores and timestamps merge with max, so stale writes cannot lower them
//! - A failed write keeps the dirty patch; it rides along with the next save
//! - Store failures end here and become a `SyncStatus` plus a warning

use serde::{Deserialize, Serialize};

use super::record::{PetPatch, PetRecord};
use super::store::RemoteStore;
use crate::error::StoreError;

/// Where the working copy stands relative to the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    Loading,
    Synced,
    /// Local changes are waiting for the debounce deadline
    Pending,
    SaveFailed,
    /// Initial load failed; running on defaults
    Offline,
    /// No identity; nothing is persisted remotely
    Guest,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Loading => "loading",
            SyncStatus::Synced => "synced",
            SyncStatus::Pending => "pending",
            SyncStatus::SaveFailed => "save failed",
            SyncStatus::Offline => "offline",
            SyncStatus::Guest => "guest",
        }
    }
}

pub struct Reconciler<S: RemoteStore> {
    store: S,
    identity: Option<String>,
    working: PetRecord,
    pending: Option<PetPatch>,
    deadline_ms: Option<u64>,
    first_pending_ms: Option<u64>,
    max_defer_ms: u64,
    status: SyncStatus,
    last_error: Option<StoreError>,
    warnings: Vec<String>,
}

impl<S: RemoteStore> Reconciler<S> {
    /// `identity: None` runs as a guest, in memory only
    pub fn new(store: S, identity: Option<String>, max_defer_ms: u64) -> Self {
        let status = if identity.is_some() {
            SyncStatus::Loading
        } else {
            SyncStatus::Guest
        };
        Self {
            store,
            identity,
            working: PetRecord::default(),
            pending: None,
            deadline_ms: None,
            first_pending_ms: None,
            max_defer_ms,
            status,
            last_error: None,
            warnings: Vec::new(),
        }
    }

    pub fn record(&self) -> &PetRecord {
        &self.working
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn is_guest(&self) -> bool {
        self.identity.is_none()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending write fires, if one is armed
    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// User-facing warnings raised since the last drain
    pub fn drain_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    fn fail(&mut self, status: SyncStatus, context: &str, err: StoreError) {
        log::warn!("{}: {}", context, err);
        self.warnings.push(format!("{}: {}", context, err));
        self.status = status;
        self.last_error = Some(err);
    }

    /// Fetch the record, creating it when the store has none.
    ///
    /// Any local changes still pending are laid back over the fetched copy.
    pub fn load(&mut self, now_ms: u64) -> &PetRecord {
        let Some(identity) = self.identity.clone() else {
            self.status = SyncStatus::Guest;
            return &self.working;
        };
        self.status = SyncStatus::Loading;

        match self.store.get(&identity) {
            Ok(Some(remote)) => {
                let local = self
                    .pending
                    .as_ref()
                    .map(|p| p.refreshed_from(&self.working));
                self.working = remote.sanitized();
                if let Some(local) = local {
                    self.working.merge(&local);
                }
                self.last_error = None;
                self.status = if self.pending.is_some() {
                    SyncStatus::Pending
                } else {
                    SyncStatus::Synced
                };
                log::info!("Loaded pet '{}' for {}", self.working.name, identity);
            }
            Ok(None) => {
                log::info!("No saved pet for {}, creating one", identity);
                let fresh = PetRecord {
                    last_updated: now_ms,
                    ..PetRecord::default()
                };
                match self.store.upsert(&identity, &fresh) {
                    Ok(stored) => {
                        self.working = stored;
                        self.last_error = None;
                        self.status = SyncStatus::Synced;
                    }
                    Err(err) => {
                        self.working = fresh;
                        self.fail(SyncStatus::Offline, "Could not create pet", err);
                    }
                }
            }
            Err(err) => {
                self.fail(SyncStatus::Offline, "Could not load pet", err);
            }
        }
        &self.working
    }

    /// Apply a change locally now and schedule it to be written after
    /// `delay_ms`. Deadlines only move later, but never past `max_defer_ms`
    /// after the oldest unsaved change.
    pub fn stage(&mut self, patch: PetPatch, now_ms: u64, delay_ms: u64) {
        if patch.is_empty() {
            return;
        }
        self.working.merge(&patch);
        self.working.last_updated = self.working.last_updated.max(now_ms);

        if self.is_guest() {
            return;
        }

        match self.pending.as_mut() {
            Some(pending) => pending.absorb(patch),
            None => self.pending = Some(patch),
        }
        let first = *self.first_pending_ms.get_or_insert(now_ms);
        let wanted = now_ms.saturating_add(delay_ms);
        let deadline = self.deadline_ms.map_or(wanted, |d| d.max(wanted));
        self.deadline_ms = Some(deadline.min(first.saturating_add(self.max_defer_ms)));
        self.status = SyncStatus::Pending;
    }

    /// Fire the pending write if its deadline has passed. Returns whether a
    /// write was attempted.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                // Failures are recorded in the status; nothing to propagate
                let _ = self.flush(now_ms);
                true
            }
            _ => false,
        }
    }

    /// Write the pending patch now: re-read the store, merge the patch (with
    /// values taken from the current working copy) and upsert once.
    pub fn flush(&mut self, now_ms: u64) -> Result<(), StoreError> {
        self.deadline_ms = None;
        self.first_pending_ms = None;
        let Some(identity) = self.identity.clone() else {
            self.pending = None;
            return Ok(());
        };
        let Some(dirty) = self.pending.take() else {
            return Ok(());
        };

        let mut patch = dirty.refreshed_from(&self.working);
        patch.last_updated = Some(now_ms.max(self.working.last_updated));

        let base = match self.store.get(&identity) {
            Ok(Some(remote)) => remote.sanitized(),
            Ok(None) => self.working.clone(),
            Err(err) => {
                log::debug!("Re-read before save failed ({}), merging onto working copy", err);
                self.working.clone()
            }
        };
        let merged = base.merged(&patch);

        match self.store.upsert(&identity, &merged) {
            Ok(stored) => {
                self.working = stored;
                self.last_error = None;
                self.status = SyncStatus::Synced;
                log::debug!("Saved pet for {}", identity);
                Ok(())
            }
            Err(err) => {
                // Keep the change locally and in the dirty set; no retry timer
                self.pending = Some(dirty);
                self.fail(SyncStatus::SaveFailed, "Save failed", err.clone());
                Err(err)
            }
        }
    }

    /// Manual save: write the whole working copy right away
    pub fn save_now(&mut self, now_ms: u64) -> Result<(), StoreError> {
        if self.is_guest() {
            return Ok(());
        }
        let full = PetPatch::full(&self.working);
        match self.pending.as_mut() {
            Some(pending) => pending.absorb(full),
            None => self.pending = Some(full),
        }
        self.flush(now_ms)
    }

    /// Manual load: push out anything pending, then fetch again
    pub fn reload(&mut self, now_ms: u64) -> &PetRecord {
        if self.has_pending() {
            let _ = self.flush(now_ms);
        }
        self.load(now_ms)
    }

    /// Remove the remote record and start over from defaults
    pub fn delete(&mut self) -> Result<(), StoreError> {
        self.pending = None;
        self.deadline_ms = None;
        self.first_pending_ms = None;
        self.working = PetRecord::default();
        let Some(identity) = self.identity.clone() else {
            return Ok(());
        };
        match self.store.delete(&identity) {
            Ok(()) => {
                log::info!("Deleted pet for {}", identity);
                self.status = SyncStatus::Synced;
                Ok(())
            }
            Err(err) => {
                self.fail(SyncStatus::SaveFailed, "Delete failed", err.clone());
                Err(err)
            }
        }
    }

    /// Drop the identity and continue as a guest on defaults
    pub fn sign_out(&mut self) {
        self.identity = None;
        self.pending = None;
        self.deadline_ms = None;
        self.first_pending_ms = None;
        self.working = PetRecord::default();
        self.last_error = None;
        self.status = SyncStatus::Guest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::GameId;
    use crate::persistence::store::MemoryStore;
    use crate::pet::StatVector;

    const MAX_DEFER: u64 = 5000;

    fn loaded(store: &MemoryStore) -> Reconciler<&MemoryStore> {
        let mut r = Reconciler::new(store, Some("player".into()), MAX_DEFER);
        r.load(0);
        r
    }

    #[test]
    fn test_rapid_patches_coalesce_into_one_write() {
        let store = MemoryStore::new();
        let mut r = loaded(&store);
        let writes = store.write_count();

        let stats = StatVector::new(50.0, 60.0, 70.0, 40.0, 90.0);
        r.stage(PetPatch::coins(15), 0, 500);
        r.stage(PetPatch::stats(&stats), 100, 1000);
        r.stage(PetPatch::best(GameId::CatchFood, 12), 200, 500);

        assert!(!r.poll(1099));
        assert_eq!(store.write_count(), writes);
        assert!(r.poll(1100));
        assert_eq!(store.write_count(), writes + 1);

        let saved = store.snapshot("player").unwrap();
        assert_eq!(saved.coins, 15);
        assert_eq!(saved.stats(), stats);
        assert_eq!(saved.catch_food_best_score, 12);
        assert_eq!(r.status(), SyncStatus::Synced);
        assert!(!r.has_pending());
    }

    #[test]
    fn test_single_field_patches_merge_into_one_write() {
        let store = MemoryStore::new();
        let mut r = loaded(&store);
        let writes = store.write_count();

        r.stage(
            PetPatch {
                hunger: Some(50.0),
                ..PetPatch::default()
            },
            0,
            1000,
        );
        r.stage(
            PetPatch {
                happiness: Some(60.0),
                ..PetPatch::default()
            },
            50,
            1000,
        );
        r.stage(PetPatch::coins(5), 100, 500);
        for now in (0..=2000).step_by(100) {
            r.poll(now);
        }

        assert_eq!(store.write_count(), writes + 1);
        let saved = store.snapshot("player").unwrap();
        assert_eq!((saved.hunger, saved.happiness, saved.coins), (50.0, 60.0, 5));
    }

    #[test]
    fn test_full_record_roundtrip() {
        let store = MemoryStore::new();
        let mut r = loaded(&store);
        let full = PetRecord {
            name: "Mochi".into(),
            hunger: 12.5,
            happiness: 33.0,
            energy: 44.0,
            cleanliness: 55.0,
            health: 66.0,
            coins: 77,
            catch_food_best_score: 8,
            click_food_best_score: 9,
            food_jump_best_score: 10,
            last_updated: 1234,
        };
        r.stage(PetPatch::full(&full), 1234, 500);
        r.save_now(1234).unwrap();

        let mut fresh = Reconciler::new(&store, Some("player".into()), MAX_DEFER);
        assert_eq!(fresh.load(2000), &full);
    }

    #[test]
    fn test_save_then_load_keeps_best_score() {
        let store = MemoryStore::new();
        let mut r = loaded(&store);
        r.stage(PetPatch::best(GameId::ClickFood, 50), 10, 500);
        r.flush(20).unwrap();
        r.stage(PetPatch::best(GameId::ClickFood, 30), 30, 500);
        r.flush(40).unwrap();

        let mut fresh = Reconciler::new(&store, Some("player".into()), MAX_DEFER);
        assert_eq!(fresh.load(100).click_food_best_score, 50);
    }

    #[test]
    fn test_load_outage_falls_back_to_defaults() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let mut r = Reconciler::new(&store, Some("player".into()), MAX_DEFER);
        let record = r.load(0).clone();

        assert_eq!(record, PetRecord::default());
        assert_eq!(r.status(), SyncStatus::Offline);
        assert!(matches!(r.last_error(), Some(StoreError::Unavailable(_))));
        assert_eq!(r.drain_warnings().len(), 1);
    }

    #[test]
    fn test_missing_record_created_immediately() {
        let store = MemoryStore::new();
        let r = loaded(&store);
        assert_eq!(store.write_count(), 1);
        assert_eq!(r.status(), SyncStatus::Synced);
        assert_eq!(store.snapshot("player").unwrap().name, "Tamagotchi");
    }

    #[test]
    fn test_failed_save_keeps_dirty_patch() {
        let store = MemoryStore::new();
        let mut r = loaded(&store);
        store.set_offline(true);

        r.stage(PetPatch::coins(33), 0, 500);
        assert!(r.poll(500));
        assert_eq!(r.status(), SyncStatus::SaveFailed);
        assert!(r.has_pending());
        assert_eq!(r.record().coins, 33);
        // No retry timer
        assert_eq!(r.deadline_ms(), None);
        assert!(!r.poll(10_000));

        store.set_offline(false);
        r.stage(PetPatch::name("Mochi"), 20_000, 500);
        assert!(r.poll(20_500));
        let saved = store.snapshot("player").unwrap();
        assert_eq!(saved.coins, 33);
        assert_eq!(saved.name, "Mochi");
    }

    #[test]
    fn test_deadline_capped_by_max_defer() {
        let store = MemoryStore::new();
        let mut r = loaded(&store);
        let mut now = 0;
        while now < 8000 {
            r.stage(PetPatch::coins(now as u32), now, 1000);
            assert!(r.deadline_ms().unwrap() <= MAX_DEFER);
            if r.poll(now) {
                break;
            }
            now += 400;
        }
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_flush_merges_remote_best_scores() {
        let store = MemoryStore::new();
        let mut r = loaded(&store);

        // Another device saved a better score meanwhile
        let mut remote = store.snapshot("player").unwrap();
        remote.food_jump_best_score = 80;
        store.upsert("player", &remote).unwrap();

        r.stage(PetPatch::best(GameId::FoodJump, 40), 10, 500);
        r.stage(PetPatch::coins(5), 20, 500);
        r.flush(30).unwrap();

        let saved = store.snapshot("player").unwrap();
        assert_eq!(saved.food_jump_best_score, 80);
        assert_eq!(saved.coins, 5);
        assert_eq!(r.record().food_jump_best_score, 80);
    }

    #[test]
    fn test_guest_never_touches_store() {
        let store = MemoryStore::new();
        let mut r = Reconciler::new(&store, None, MAX_DEFER);
        r.load(0);
        r.stage(PetPatch::coins(3), 0, 10);
        assert!(!r.poll(100));
        r.save_now(200).unwrap();
        assert_eq!(r.record().coins, 3);
        assert_eq!(r.status(), SyncStatus::Guest);
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.read_count(), 0);
    }

    #[test]
    fn test_delete_and_sign_out() {
        let store = MemoryStore::new();
        let mut r = loaded(&store);
        r.stage(PetPatch::coins(9), 0, 500);
        r.delete().unwrap();
        assert!(store.snapshot("player").is_none());
        assert!(!r.has_pending());
        assert_eq!(r.record().coins, 0);

        r.sign_out();
        assert!(r.is_guest());
        assert_eq!(r.status(), SyncStatus::Guest);
    }

    #[test]
    fn test_reload_flushes_first() {
        let store = MemoryStore::new();
        let mut r = loaded(&store);
        r.stage(PetPatch::coins(21), 0, 500);
        assert_eq!(r.reload(10).coins, 21);
        assert_eq!(store.snapshot("player").unwrap().coins, 21);
    }
}
