//! # HTTP Server Module
//!
//! Axum server exposing the books and users collections, file exports and
//! avatar uploads.
//!
//! # Endpoints
//!
//! - `/books/*` - book CRUD, `?category=` filtering
//! - `/users/*` - user CRUD and avatar upload
//! - `/files/*` - exports and uploads
//! - everything else - static files from the public folder

pub mod config;
pub mod errors;
pub mod files_routes;
pub mod resource_routes;
pub mod routes;
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use routes::{Endpoint, ENDPOINTS};
pub use server::{HttpServer, COLLECTIONS};
