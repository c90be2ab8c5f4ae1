//! Completion progress
//!
//! A single JSON object `{ "<game-id>": true }` stored under one namespaced
//! key. A missing or corrupt record reads as "nothing completed".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::games::GameId;
use crate::storage::{KvStore, StorageError};

/// Storage key (versioned namespace)
pub const STORAGE_KEY: &str = "mxw:progress:v1";

/// Completion flags keyed by game id string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressRecord {
    pub completed: BTreeMap<String, bool>,
}

impl ProgressRecord {
    pub fn is_completed(&self, id: GameId) -> bool {
        self.completed.get(id.as_str()).copied().unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.completed.values().filter(|done| **done).count()
    }
}

/// Progress persisted through a [`KvStore`]
#[derive(Debug)]
pub struct ProgressStore<S: KvStore> {
    backend: S,
}

impl<S: KvStore> ProgressStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Current record; read or parse failures fall back to an empty one
    pub fn record(&self) -> ProgressRecord {
        match self.try_record() {
            Ok(record) => record,
            Err(err) => {
                log::warn!("Progress unreadable, starting fresh: {err}");
                ProgressRecord::default()
            }
        }
    }

    fn try_record(&self) -> Result<ProgressRecord, StorageError> {
        match self.backend.get(STORAGE_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(ProgressRecord::default()),
        }
    }

    pub fn is_completed(&self, id: GameId) -> bool {
        self.record().is_completed(id)
    }

    /// Set the flag for `id`. Idempotent; returns true if it was not set before.
    pub fn mark_completed(&mut self, id: GameId) -> bool {
        let mut record = self.record();
        if record.is_completed(id) {
            return false;
        }
        record.completed.insert(id.as_str().to_string(), true);
        match self.write(&record) {
            Ok(()) => log::info!("Marked '{}' as completed", id.as_str()),
            Err(err) => log::warn!("Failed to save progress: {err}"),
        }
        true
    }

    fn write(&mut self, record: &ProgressRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)?;
        self.backend.set(STORAGE_KEY, &json)
    }

    /// Forget all progress
    pub fn reset_all(&mut self) {
        match self.backend.remove(STORAGE_KEY) {
            Ok(()) => log::info!("Progress reset"),
            Err(err) => log::warn!("Failed to reset progress: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    /// Backend whose every operation fails
    struct Broken;

    impl KvStore for Broken {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_absent_means_not_completed() {
        let store = ProgressStore::new(MemoryStore::new());
        assert!(!store.is_completed(GameId::CargaElectrica));
    }

    #[test]
    fn test_mark_and_persist_format() {
        let mut store = ProgressStore::new(MemoryStore::new());
        assert!(store.mark_completed(GameId::GaussMagnetico));
        assert!(store.is_completed(GameId::GaussMagnetico));
        assert!(!store.is_completed(GameId::CiclaDinamo));
        let raw = store.backend().get(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"gauss-magnetico":true}"#);
    }

    #[test]
    fn test_corrupt_record_reads_empty() {
        let mut backend = MemoryStore::new();
        backend.set(STORAGE_KEY, "{oops").unwrap();
        let mut store = ProgressStore::new(backend);
        assert!(!store.is_completed(GameId::CargaElectrica));
        // Writing over a corrupt record recovers it
        store.mark_completed(GameId::CargaElectrica);
        assert!(store.is_completed(GameId::CargaElectrica));
    }

    #[test]
    fn test_false_flag_reads_not_completed() {
        let mut backend = MemoryStore::new();
        backend
            .set(STORAGE_KEY, r#"{"carga-electrica":false,"unknown-game":true}"#)
            .unwrap();
        let store = ProgressStore::new(backend);
        assert!(!store.is_completed(GameId::CargaElectrica));
        assert_eq!(store.record().count(), 1);
    }

    #[test]
    fn test_reset_all() {
        let mut store = ProgressStore::new(MemoryStore::new());
        store.mark_completed(GameId::CargaElectrica);
        store.reset_all();
        assert!(!store.is_completed(GameId::CargaElectrica));
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_broken_backend_is_not_fatal() {
        let mut store = ProgressStore::new(Broken);
        assert!(!store.is_completed(GameId::CargaElectrica));
        store.mark_completed(GameId::CargaElectrica);
        store.reset_all();
    }

    fn any_game() -> impl Strategy<Value = GameId> {
        prop::sample::select(GameId::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_marking_is_idempotent(ids in proptest::collection::vec(any_game(), 1..12)) {
            let mut once = ProgressStore::new(MemoryStore::new());
            let mut twice = ProgressStore::new(MemoryStore::new());
            for id in &ids {
                once.mark_completed(*id);
                twice.mark_completed(*id);
                twice.mark_completed(*id);
            }
            prop_assert_eq!(once.record(), twice.record());
            for id in &ids {
                prop_assert!(once.is_completed(*id));
            }
        }
    }
}
