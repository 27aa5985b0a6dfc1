//! # Image Hosting
//!
//! Hand-off of uploaded images to an external hosting service. The service
//! itself is outside this crate; the server is given an [`ImageHost`] at
//! construction.

use futures_util::future::{self, BoxFuture, FutureExt};

use super::avatars::UploadedFile;
use super::errors::{UploadError, UploadResult};

/// Folder images are filed under on the hosting service
pub const DEFAULT_FOLDER: &str = "bookshelf/books";

/// An image accepted by the host
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HostedImage {
    pub url: String,
}

/// External image hosting service
pub trait ImageHost: Send + Sync + std::fmt::Debug {
    /// Upload `file` into `folder`, returning where it can be fetched
    fn upload<'a>(&'a self, folder: &'a str, file: &'a UploadedFile) -> BoxFuture<'a, UploadResult<HostedImage>>;
}

/// Host used when no service is configured; every upload fails
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredImageHost;

impl ImageHost for UnconfiguredImageHost {
    fn upload<'a>(&'a self, _folder: &'a str, _file: &'a UploadedFile) -> BoxFuture<'a, UploadResult<HostedImage>> {
        future::ready(Err(UploadError::UpstreamUnavailable(
            "no image host configured".to_string(),
        )))
        .boxed()
    }
}
