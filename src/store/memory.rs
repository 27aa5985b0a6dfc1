//! # In-Memory Backend

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use futures_util::future::{self, BoxFuture, FutureExt};

use super::backend::{BlobBackend, BlobReader};

/// Blob backend keeping every blob in process memory.
///
/// Can be switched offline to simulate an unreachable store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    offline: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail (or succeed again)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Seed a blob with raw content
    pub fn insert(&self, name: &str, data: impl Into<Vec<u8>>) {
        self.lock().insert(name.to_string(), data.into());
    }

    /// Raw content of a blob, if present
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().get(name).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still structurally valid
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_online(&self) -> io::Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "memory backend is offline",
            ));
        }
        Ok(())
    }

    fn fetch(&self, name: &str) -> io::Result<Vec<u8>> {
        self.check_online()?;
        self.lock()
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no blob '{}'", name)))
    }
}

impl BlobBackend for MemoryBackend {
    fn read<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<Vec<u8>>> {
        future::ready(self.fetch(name)).boxed()
    }

    fn write<'a>(&'a self, name: &'a str, data: Vec<u8>) -> BoxFuture<'a, io::Result<()>> {
        let result = self.check_online().map(|_| {
            self.lock().insert(name.to_string(), data);
        });
        future::ready(result).boxed()
    }

    fn open<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<BlobReader>> {
        let result = self
            .fetch(name)
            .map(|data| Box::pin(Cursor::new(data)) as BlobReader);
        future::ready(result).boxed()
    }

    fn exists<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<bool>> {
        let result = self
            .check_online()
            .map(|_| self.lock().contains_key(name));
        future::ready(result).boxed()
    }
}
