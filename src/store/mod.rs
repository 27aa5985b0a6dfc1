//! # Record Store Module
//!
//! Durable load/save of whole collections against a pluggable blob backend.

pub mod backend;
pub mod errors;
pub mod local;
pub mod memory;
pub mod record_store;
pub mod sequence;

pub use backend::{BlobBackend, BlobReader};
pub use errors::{StoreError, StoreResult};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use record_store::{CollectionGuard, RecordStore};
pub use sequence::{ArraySplitter, RecordSequence};
