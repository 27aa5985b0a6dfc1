//! # HTTP Server
//!
//! Combines the resource, files and static routers into one Axum app.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::ServerConfig;
use super::files_routes::{avatar_routes, files_routes, AvatarState, FilesState};
use super::resource_routes::{resource_routes, ResourceState};
use super::routes::ENDPOINTS;
use crate::resource::ResourceRepository;
use crate::store::{RecordStore, StoreResult};
use crate::upload::{AvatarStore, ImageHost, UnconfiguredImageHost};

/// Collections created at boot when missing
pub const COLLECTIONS: [&str; 2] = ["books", "users"];

/// HTTP server for the books and users API
pub struct HttpServer {
    config: ServerConfig,
    store: Arc<RecordStore>,
    router: Router,
}

impl HttpServer {
    /// Server keeping collections as JSON files under `config.data_dir`
    pub fn with_config(config: ServerConfig) -> Self {
        let store = Arc::new(RecordStore::local(&config.data_dir));
        Self::with_parts(config, store, Arc::new(UnconfiguredImageHost))
    }

    /// Server over an explicit store and image host
    pub fn with_parts(config: ServerConfig, store: Arc<RecordStore>, image_host: Arc<dyn ImageHost>) -> Self {
        let router = Self::build_router(&config, store.clone(), image_host);
        Self {
            config,
            store,
            router,
        }
    }

    fn build_router(config: &ServerConfig, store: Arc<RecordStore>, image_host: Arc<dyn ImageHost>) -> Router {
        let books = ResourceRepository::books(store.clone());
        let users = ResourceRepository::users(store.clone());
        let avatars = AvatarStore::new(&config.public_dir);

        let books_state = Arc::new(ResourceState::new(books).filterable_by("category"));
        let users_state = Arc::new(ResourceState::new(users.clone()));
        let avatar_state = Arc::new(AvatarState {
            users,
            avatars: avatars.clone(),
            upload_limit: config.upload_limit_bytes,
        });
        let files_state = Arc::new(FilesState {
            store,
            avatars,
            image_host,
            upload_limit: config.upload_limit_bytes,
        });

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .nest("/books", resource_routes(books_state))
            .nest(
                "/users",
                resource_routes(users_state).merge(avatar_routes(avatar_state)),
            )
            .nest("/files", files_routes(files_state))
            // Avatars and anything else under the public folder
            .fallback_service(ServeDir::new(&config.public_dir))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Get the router (for testing)
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Create every missing collection
    pub async fn initialize(&self) -> StoreResult<()> {
        for resource in COLLECTIONS {
            self.store.initialize(resource).await?;
        }
        Ok(())
    }

    /// Initialize storage, bind and serve until the process stops
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        self.initialize().await.map_err(std::io::Error::other)?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, data_dir = %self.config.data_dir.display(), "bookshelf listening");
        for endpoint in ENDPOINTS {
            info!(method = endpoint.method, path = endpoint.path, "route");
        }

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
