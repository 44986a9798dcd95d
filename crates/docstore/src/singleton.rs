//! Fixed-key settings records

use crate::{Collection, DocumentStore, Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// A collection that only ever holds the document with one well-known id
///
/// Reads never report "not found": a missing record is created from the
/// supplied default and persisted first.
#[derive(Debug, Clone)]
pub struct SingletonRecord<T> {
    collection: Collection<T>,
    id: String,
}

impl<T: Serialize + DeserializeOwned> SingletonRecord<T> {
    pub fn new(store: Arc<dyn DocumentStore>, collection: &str, id: &str) -> Self {
        Self {
            collection: Collection::new(store, collection),
            id: id.to_string(),
        }
    }

    /// The well-known id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current value, if stored
    pub fn get(&self) -> Result<Option<T>> {
        self.collection.find_one(&self.id)
    }

    /// Current value, inserting `default()` if nothing is stored yet
    ///
    /// When another writer inserts the record concurrently, its value wins
    /// and is returned instead of the local default.
    pub fn get_or_insert_with<F>(&self, default: F) -> Result<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get()? {
            return Ok(value);
        }

        let value = default();
        let mut document = serde_json::to_value(&value)?;
        if let Some(map) = document.as_object_mut() {
            map.insert(crate::ID_FIELD.to_string(), self.id.clone().into());
        }

        let store = self.store();
        match store.insert_one(self.collection.name(), document) {
            Ok(()) => {
                info!(collection = self.collection.name(), id = %self.id, "created default record");
                Ok(value)
            }
            Err(StoreError::DuplicateKey { .. }) => {
                debug!(collection = self.collection.name(), id = %self.id, "lost insert race");
                self.get()?.map_or(Ok(value), Ok)
            }
            Err(e) => Err(e),
        }
    }

    /// Store `value` under the well-known id, inserting if absent
    pub fn replace(&self, value: &T) -> Result<()> {
        self.collection.replace_one(&self.id, value, true)?;
        Ok(())
    }

    fn store(&self) -> Arc<dyn DocumentStore> {
        self.collection.store()
    }
}
