use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::ids::RecordId;

/// Anything the workflows persist under a [`RecordId`].
pub trait StoredRecord: Clone + Send + Sync + 'static {
    fn record_id(&self) -> &RecordId;
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait RecordStore<T: StoredRecord>: Send + Sync {
    fn insert(&self, record: T) -> Result<T, RepositoryError>;
    /// Replace the stored copy only while `precondition` holds for it;
    /// otherwise nothing is written and `Stale` is returned.
    fn update_if(
        &self,
        record: T,
        precondition: &dyn Fn(&T) -> bool,
    ) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &RecordId) -> Result<Option<T>, RepositoryError>;
    fn list(&self) -> Result<Vec<T>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record changed since it was read")]
    Stale,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store keyed by record id.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    records: Arc<Mutex<BTreeMap<RecordId, T>>>,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl<T> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T: StoredRecord> RecordStore<T> for InMemoryStore<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(record.record_id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.record_id().clone(), record.clone());
        Ok(record)
    }

    fn update_if(
        &self,
        record: T,
        precondition: &dyn Fn(&T) -> bool,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        match guard.get_mut(record.record_id()) {
            Some(slot) if precondition(slot) => {
                *slot = record;
                Ok(())
            }
            Some(_) => Err(RepositoryError::Stale),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &RecordId) -> Result<Option<T>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}
