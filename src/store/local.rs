//! # Local Filesystem Backend
//!
//! One `<name>.json` file per blob under a root directory. Writes go to a
//! sibling `.tmp` file that is renamed over the target, so readers never
//! observe a truncated collection.

use std::io;
use std::path::PathBuf;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::backend::{BlobBackend, BlobReader};

/// Local filesystem blob backend
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json.tmp", name))
    }
}

impl BlobBackend for LocalBackend {
    fn read<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<Vec<u8>>> {
        async move { fs::read(self.blob_path(name)).await }.boxed()
    }

    fn write<'a>(&'a self, name: &'a str, data: Vec<u8>) -> BoxFuture<'a, io::Result<()>> {
        async move {
            fs::create_dir_all(&self.root).await?;

            let temp = self.temp_path(name);
            let mut file = fs::File::create(&temp).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            drop(file);

            fs::rename(&temp, self.blob_path(name)).await
        }
        .boxed()
    }

    fn open<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<BlobReader>> {
        async move {
            let file = fs::File::open(self.blob_path(name)).await?;
            Ok(Box::pin(file) as BlobReader)
        }
        .boxed()
    }

    fn exists<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<bool>> {
        async move { fs::try_exists(self.blob_path(name)).await }.boxed()
    }
}
