//! # Upload Module
//!
//! Storage targets for files received over multipart requests: the public
//! avatar folder and an external image host.

pub mod avatars;
pub mod errors;
pub mod image_host;

pub use avatars::{name_with_extension, AvatarStore, UploadedFile};
pub use errors::{UploadError, UploadResult};
pub use image_host::{HostedImage, ImageHost, UnconfiguredImageHost};
