//! Remote record store interface and an in-memory implementation

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::record::PetRecord;
use crate::error::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Key-value store of pet records keyed by player identity.
///
/// Implementations wrap whatever transport the host uses. A missing record is
/// `Ok(None)`, never an error.
pub trait RemoteStore {
    fn get(&self, identity: &str) -> Result<Option<PetRecord>>;

    /// Insert or replace; returns the record as stored
    fn upsert(&self, identity: &str, record: &PetRecord) -> Result<PetRecord>;

    fn delete(&self, identity: &str) -> Result<()>;
}

impl<S: RemoteStore + ?Sized> RemoteStore for &S {
    fn get(&self, identity: &str) -> Result<Option<PetRecord>> {
        (**self).get(identity)
    }

    fn upsert(&self, identity: &str, record: &PetRecord) -> Result<PetRecord> {
        (**self).upsert(identity, record)
    }

    fn delete(&self, identity: &str) -> Result<()> {
        (**self).delete(identity)
    }
}

/// In-memory store with request counters and a switchable outage
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, PetRecord>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one record
    pub fn with_record(identity: &str, record: PetRecord) -> Self {
        let store = Self::default();
        if let Ok(mut records) = store.records.write() {
            records.insert(identity.to_string(), record);
        }
        store
    }

    /// Make every request fail with `Unavailable` until switched back
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Successful upserts so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Direct peek without touching the counters
    pub fn snapshot(&self, identity: &str) -> Option<PetRecord> {
        self.records
            .read()
            .ok()
            .and_then(|records| records.get(identity).cloned())
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn get(&self, identity: &str) -> Result<Option<PetRecord>> {
        self.check_online()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(identity).cloned())
    }

    fn upsert(&self, identity: &str, record: &PetRecord) -> Result<PetRecord> {
        self.check_online()?;
        if identity.is_empty() {
            return Err(StoreError::Rejected("empty identity".into()));
        }
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        records.insert(identity.to_string(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record.clone())
    }

    fn delete(&self, identity: &str) -> Result<()> {
        self.check_online()?;
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        records.remove(identity);
        Ok(())
    }
}
