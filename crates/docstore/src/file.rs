//! JSON-file document store
//!
//! Layout: `<root>/<collection>/<id>.json`. Every write goes to a temporary
//! file in the collection directory which is then renamed over the target,
//! so readers never observe a partially written document.

use crate::{
    document_id, validate_key, with_id, CancelToken, DocumentStore, Result, StoreError,
};
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Store keeping each document in its own JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    cancel: CancelToken,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            cancel: CancelToken::default(),
        })
    }

    /// Attach a cancellation token checked before every operation
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf> {
        validate_key(collection)?;
        Ok(self.root.join(collection))
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        validate_key(id)?;
        Ok(self.collection_dir(collection)?.join(format!("{id}.json")))
    }

    fn read_document(path: &Path) -> Result<Option<Value>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Serialise `document` into a temp file in the collection directory
    fn stage(&self, collection: &str, document: &Value) -> Result<NamedTempFile> {
        let dir = self.collection_dir(collection)?;
        fs::create_dir_all(&dir)?;

        let mut staged = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut staged, document)?;
        staged.write_all(b"\n")?;
        staged.as_file().sync_all()?;
        Ok(staged)
    }
}

impl DocumentStore for JsonFileStore {
    fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.cancel.check()?;
        let path = self.document_path(collection, id)?;
        Self::read_document(&path)
    }

    fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        self.cancel.check()?;
        let dir = self.collection_dir(collection)?;

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            self.cancel.check()?;
            // removed between listing and reading
            if let Some(doc) = Self::read_document(&path)? {
                documents.push(doc);
            }
        }
        Ok(documents)
    }

    fn insert_one(&self, collection: &str, document: Value) -> Result<()> {
        self.cancel.check()?;
        let id = document_id(collection, &document)?;
        let path = self.document_path(collection, &id)?;

        let staged = self.stage(collection, &document)?;
        self.cancel.check()?;
        staged.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    id: id.clone(),
                }
            } else {
                StoreError::Io(e.error)
            }
        })?;

        debug!(collection, id = %id, "inserted document");
        Ok(())
    }

    fn replace_one(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        upsert: bool,
    ) -> Result<bool> {
        self.cancel.check()?;
        let path = self.document_path(collection, id)?;
        let document = with_id(collection, document, id)?;

        if !upsert && !path.exists() {
            return Ok(false);
        }

        let staged = self.stage(collection, &document)?;
        // dropping the staged file removes it, nothing reaches `path`
        self.cancel.check()?;
        staged.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(collection, id, "replaced document");
        Ok(true)
    }

    fn delete_one(&self, collection: &str, id: &str) -> Result<bool> {
        self.cancel.check()?;
        let path = self.document_path(collection, id)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(collection, id, "deleted document");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
