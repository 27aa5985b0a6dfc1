//! # Record Store
//!
//! Whole-collection load and save on top of a [`BlobBackend`].
//!
//! A collection is persisted as one JSON array under the resource name.
//! There are no partial reads or writes: `load` parses the entire blob and
//! `save` replaces it. Mutating callers serialize their load-mutate-save
//! cycles through [`RecordStore::lock`].

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::backend::BlobBackend;
use super::errors::{StoreError, StoreResult};
use super::local::LocalBackend;
use super::sequence::RecordSequence;
use crate::record::Collection;

/// Exclusive access to one collection for a load-mutate-save cycle
pub type CollectionGuard = OwnedMutexGuard<()>;

/// Store of named collections
#[derive(Debug)]
pub struct RecordStore {
    backend: Arc<dyn BlobBackend>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl RecordStore {
    /// Create a store over any backend
    pub fn new(backend: Arc<dyn BlobBackend>) -> Self {
        Self {
            backend,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store keeping one JSON file per collection in `data_dir`
    pub fn local(data_dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(LocalBackend::new(data_dir)))
    }

    /// Load an entire collection.
    ///
    /// A missing blob is reported as unavailable; use [`initialize`] to
    /// create an empty collection first.
    ///
    /// [`initialize`]: RecordStore::initialize
    pub async fn load(&self, resource: &str) -> StoreResult<Collection> {
        let data = self
            .backend
            .read(resource)
            .await
            .map_err(|e| unavailable(resource, e))?;

        let collection: Collection =
            serde_json::from_slice(&data).map_err(|e| StoreError::corrupt(resource, e))?;

        debug!(resource, records = collection.len(), "collection loaded");
        Ok(collection)
    }

    /// Replace an entire collection
    pub async fn save(&self, resource: &str, collection: &Collection) -> StoreResult<()> {
        let data = serde_json::to_vec(collection).map_err(|e| StoreError::corrupt(resource, e))?;

        self.backend
            .write(resource, data)
            .await
            .map_err(|e| unavailable(resource, e))?;

        debug!(resource, records = collection.len(), "collection saved");
        Ok(())
    }

    /// Create an empty collection if none is stored yet.
    ///
    /// Returns `true` when a new blob was written.
    pub async fn initialize(&self, resource: &str) -> StoreResult<bool> {
        let _guard = self.lock(resource).await;

        let exists = self
            .backend
            .exists(resource)
            .await
            .map_err(|e| unavailable(resource, e))?;
        if exists {
            return Ok(false);
        }

        self.save(resource, &Vec::new()).await?;
        info!(resource, "initialized empty collection");
        Ok(true)
    }

    /// Open a lazy sequence over the serialized records of a collection
    pub async fn open_record_sequence(&self, resource: &str) -> StoreResult<RecordSequence> {
        let reader = self
            .backend
            .open(resource)
            .await
            .map_err(|e| unavailable(resource, e))?;
        Ok(RecordSequence::new(resource, reader))
    }

    /// Acquire the per-collection write lock
    pub async fn lock(&self, resource: &str) -> CollectionGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks
                .entry(resource.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

fn unavailable(resource: &str, err: io::Error) -> StoreError {
    StoreError::unavailable(resource, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::store::MemoryBackend;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::local(temp.path());

        let books = vec![
            record(json!({"id": "1", "title": "Dune"})),
            record(json!({"id": "2", "title": "Emma"})),
        ];
        store.save("books", &books).await.unwrap();

        assert_eq!(store.load("books").await.unwrap(), books);
    }

    #[tokio::test]
    async fn test_missing_blob_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::local(temp.path());

        let err = store.load("books").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_initialize_creates_empty_collection_once() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::local(temp.path());

        assert!(store.initialize("users").await.unwrap());
        assert!(store.load("users").await.unwrap().is_empty());

        store
            .save("users", &vec![record(json!({"id": "1"}))])
            .await
            .unwrap();
        assert!(!store.initialize("users").await.unwrap());
        assert_eq!(store.load("users").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_blob_is_corrupt() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("books", "{not json");
        backend.insert("users", "[1, 2]");
        let store = RecordStore::new(backend);

        assert!(matches!(
            store.load("books").await.unwrap_err(),
            StoreError::CorruptData { .. }
        ));
        assert!(matches!(
            store.load("users").await.unwrap_err(),
            StoreError::CorruptData { .. }
        ));
    }

    #[tokio::test]
    async fn test_offline_backend_is_unavailable() {
        let backend = Arc::new(MemoryBackend::new());
        let store = RecordStore::new(backend.clone());
        backend.set_offline(true);

        let err = store.save("books", &Vec::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_open_record_sequence() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert("books", r#"[{"id":"1"},{"id":"2"}]"#);
        let store = RecordStore::new(backend);

        let mut sequence = store.open_record_sequence("books").await.unwrap();
        let mut count = 0;
        while sequence.next_record().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_lock_is_per_resource() {
        let store = Arc::new(RecordStore::new(Arc::new(MemoryBackend::new())));

        let books_guard = store.lock("books").await;

        // Another collection is not blocked
        let users = tokio::time::timeout(Duration::from_millis(100), store.lock("users")).await;
        assert!(users.is_ok());

        // The same collection waits for the holder
        let books = tokio::time::timeout(Duration::from_millis(50), store.lock("books")).await;
        assert!(books.is_err());

        drop(books_guard);
        let books = tokio::time::timeout(Duration::from_millis(100), store.lock("books")).await;
        assert!(books.is_ok());
    }
}
