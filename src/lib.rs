//! bookshelf - books and users over flat JSON files
//!
//! CRUD over whole-collection JSON files, plus streamed exports (gzip, CSV,
//! PDF) and avatar uploads.

pub mod cli;
pub mod export;
pub mod http_server;
pub mod record;
pub mod resource;
pub mod store;
pub mod upload;
pub mod validation;
