//! Docstore - document persistence for the back office
//!
//! Documents are JSON objects keyed by a string `_id` and grouped in named
//! collections. Two backends implement [`DocumentStore`]:
//! - [`MemoryStore`]: process-local, for tests and previews
//! - [`JsonFileStore`]: one JSON file per document, replaced atomically
//!
//! Typed access goes through [`Collection`], and settings that only ever
//! have one row go through [`SingletonRecord`].
//!
//! # Example
//!
//! ```ignore
//! use docstore::{Collection, JsonFileStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(JsonFileStore::open("data")?);
//! let students: Collection<Student> = Collection::new(store, "Students");
//! let all = students.find_all()?;
//! ```

mod cancel;
mod collection;
mod file;
mod memory;
mod singleton;

pub use cancel::CancelToken;
pub use collection::Collection;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use singleton::SingletonRecord;

use serde_json::Value;
use thiserror::Error;

/// Key holding a document's identity
pub const ID_FIELD: &str = "_id";

/// Errors that can occur in a document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate key {id} in collection {collection}")]
    DuplicateKey { collection: String, id: String },

    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("Document in {0} has no string _id")]
    MissingId(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence collaborator over JSON documents
///
/// Single-document writes are atomic: a concurrent reader observes either
/// the previous or the new document, never a mix.
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id
    fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// All documents of a collection, ordered by id
    fn find_all(&self, collection: &str) -> Result<Vec<Value>>;

    /// Insert a new document, failing with `DuplicateKey` if the id exists
    fn insert_one(&self, collection: &str, document: Value) -> Result<()>;

    /// Replace the document with `id`
    ///
    /// The stored `_id` is forced to `id`. With `upsert` a missing document
    /// is inserted. Returns whether a document was written.
    fn replace_one(&self, collection: &str, id: &str, document: Value, upsert: bool)
        -> Result<bool>;

    /// Delete by id, returning whether a document was removed
    fn delete_one(&self, collection: &str, id: &str) -> Result<bool>;
}

/// Extract the `_id` of a document
pub fn document_id(collection: &str, document: &Value) -> Result<String> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::MissingId(collection.to_string()))
}

/// Set the `_id` of a document, rejecting non-object documents
pub(crate) fn with_id(collection: &str, mut document: Value, id: &str) -> Result<Value> {
    match document.as_object_mut() {
        Some(map) => {
            map.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
            Ok(document)
        }
        None => Err(StoreError::MissingId(collection.to_string())),
    }
}

/// Check that a collection name or id is usable as a storage key
///
/// Allowed: ASCII letters, digits, `-`, `_` and `.`, not starting with a
/// dot, at most 128 characters.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(key.to_string()))
    }
}
