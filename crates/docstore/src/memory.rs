//! In-memory document store

use crate::{document_id, validate_key, with_id, CancelToken, DocumentStore, Result, StoreError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// Process-local store backed by a mutex-guarded map
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    cancel: CancelToken,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token checked before every operation
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>> {
        self.cancel.check()?;
        // documents are plain values; a panicking writer cannot leave one half-updated
        Ok(self
            .collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

impl DocumentStore for MemoryStore {
    fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    fn insert_one(&self, collection: &str, document: Value) -> Result<()> {
        let id = document_id(collection, &document)?;
        validate_key(&id)?;
        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.contains_key(&id) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                id,
            });
        }
        docs.insert(id, document);
        Ok(())
    }

    fn replace_one(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        upsert: bool,
    ) -> Result<bool> {
        validate_key(id)?;
        let document = with_id(collection, document, id)?;
        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();

        if !upsert && !docs.contains_key(id) {
            return Ok(false);
        }
        docs.insert(id.to_string(), document);
        Ok(true)
    }

    fn delete_one(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self.lock()?;
        Ok(collections
            .get_mut(collection)
            .map(|docs| docs.remove(id).is_some())
            .unwrap_or(false))
    }
}
