//! Resource HTTP Routes
//!
//! The same five CRUD endpoints for every collection:
//!
//! - `POST /` - create, 201 `{id}`
//! - `GET /` - list, optionally filtered by a query parameter
//! - `GET /:id` - fetch one
//! - `PUT /:id` - merge fields into one
//! - `DELETE /:id` - remove one, 204

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::errors::ApiResult;
use crate::record::{Payload, Record};
use crate::resource::{RecordFilter, ResourceRepository};

// ==================
// Shared State
// ==================

/// State for one collection's routes
pub struct ResourceState {
    pub repository: ResourceRepository,
    /// Query parameters accepted as equality filters on `GET /`
    pub filter_fields: Vec<String>,
}

impl ResourceState {
    pub fn new(repository: ResourceRepository) -> Self {
        Self {
            repository,
            filter_fields: Vec::new(),
        }
    }

    /// Allow `GET /?<field>=<value>` filtering
    pub fn filterable_by(mut self, field: impl Into<String>) -> Self {
        self.filter_fields.push(field.into());
        self
    }

    /// Filter from the first accepted query parameter with a value; blank
    /// values such as `?category=` mean no filter
    fn filter_from_query(&self, query: &HashMap<String, String>) -> Option<RecordFilter> {
        self.filter_fields.iter().find_map(|field| {
            query
                .get(field)
                .filter(|value| !value.trim().is_empty())
                .map(|value| RecordFilter::eq(field.clone(), value.clone()))
        })
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

// ==================
// Resource Routes
// ==================

/// Create CRUD routes over one repository
pub fn resource_routes(state: Arc<ResourceState>) -> Router {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route(
            "/:id",
            get(get_handler).put(replace_handler).delete(delete_handler),
        )
        .with_state(state)
}

async fn create_handler(
    State(state): State<Arc<ResourceState>>,
    body: Result<Json<Payload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let Json(payload) = body?;
    let id = state.repository.create(payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn list_handler(
    State(state): State<Arc<ResourceState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Record>>> {
    let filter = state.filter_from_query(&query);
    let records = state.repository.list(filter.as_ref()).await?;
    Ok(Json(records))
}

async fn get_handler(
    State(state): State<Arc<ResourceState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Record>> {
    Ok(Json(state.repository.get_by_id(&id).await?))
}

async fn replace_handler(
    State(state): State<Arc<ResourceState>>,
    Path(id): Path<String>,
    body: Result<Json<Payload>, JsonRejection>,
) -> ApiResult<Json<Record>> {
    let Json(payload) = body?;
    Ok(Json(state.repository.replace_by_id(&id, payload).await?))
}

async fn delete_handler(
    State(state): State<Arc<ResourceState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.repository.delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
