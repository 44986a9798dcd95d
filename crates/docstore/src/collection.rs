//! Typed view over a store collection

use crate::{document_id, DocumentStore, Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// A named collection whose documents deserialize into `T`
///
/// `T` must serialize to a JSON object carrying its identity under `_id`.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("name", &self.name).finish()
    }
}

impl<T: Serialize + DeserializeOwned> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>, name: &str) -> Self {
        Self {
            store,
            name: name.to_string(),
            _marker: PhantomData,
        }
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    pub fn find_one(&self, id: &str) -> Result<Option<T>> {
        self.store
            .find_one(&self.name, id)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    pub fn find_all(&self) -> Result<Vec<T>> {
        self.store
            .find_all(&self.name)?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .collect()
    }

    /// Insert a new document, returning its id
    pub fn insert_one(&self, value: &T) -> Result<String> {
        let document = serde_json::to_value(value)?;
        let id = document_id(&self.name, &document)?;
        self.store.insert_one(&self.name, document)?;
        Ok(id)
    }

    /// Replace (or with `upsert`, insert) the document with `id`
    pub fn replace_one(&self, id: &str, value: &T, upsert: bool) -> Result<bool> {
        let document = serde_json::to_value(value)?;
        self.store.replace_one(&self.name, id, document, upsert)
    }

    pub fn delete_one(&self, id: &str) -> Result<bool> {
        self.store.delete_one(&self.name, id)
    }
}
