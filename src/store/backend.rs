//! # Blob Backend Trait

use std::io;
use std::pin::Pin;

use futures_util::future::BoxFuture;
use tokio::io::AsyncRead;

/// Streaming handle over a stored blob
pub type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

/// Backend trait for whole-blob persistence.
///
/// A blob is addressed by a plain name (the resource type). Backends report
/// raw I/O failures; a missing blob is `io::ErrorKind::NotFound`.
pub trait BlobBackend: Send + Sync + std::fmt::Debug {
    /// Read the entire blob
    fn read<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<Vec<u8>>>;

    /// Replace the entire blob
    fn write<'a>(&'a self, name: &'a str, data: Vec<u8>) -> BoxFuture<'a, io::Result<()>>;

    /// Open the blob for sequential reading
    fn open<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<BlobReader>>;

    /// Check if the blob exists
    fn exists<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<bool>>;
}
