//! # Resource Module
//!
//! Generic CRUD repositories over flat-file collections, shared by the
//! books and users endpoints.

pub mod errors;
pub mod filter;
pub mod repository;

pub use errors::{RepositoryError, RepositoryResult};
pub use filter::RecordFilter;
pub use repository::ResourceRepository;
