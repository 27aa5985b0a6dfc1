//! Files HTTP Routes
//!
//! Book exports and avatar uploads.
//!
//! Exports are streamed: the pipeline runs in its own task and writes into
//! an in-process pipe whose read half is the response body. If a stage fails
//! after the first bytes went out, the body ends with an error so the client
//! sees an aborted transfer instead of a short file.

use std::io;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use futures_util::{future, stream, StreamExt};
use serde_json::Value;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

use super::errors::ApiResult;
use crate::export::{DocumentLayout, ExportPipeline, Transform};
use crate::record::{Payload, Record};
use crate::resource::ResourceRepository;
use crate::store::RecordStore;
use crate::upload::{
    name_with_extension, AvatarStore, HostedImage, ImageHost, UploadError, UploadResult,
    UploadedFile,
};
use crate::upload::image_host::DEFAULT_FOLDER;

/// Collection every export reads from
const BOOKS: &str = "books";
/// Columns of the CSV export
const CSV_FIELDS: [&str; 3] = ["asin", "title", "category"];
/// Pipe capacity between a running export and its response body
const EXPORT_BUFFER: usize = 64 * 1024;
/// Ceiling for a whole multipart request
const MULTIPART_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Reply body for accepted uploads
pub const UPLOADED: &str = "UPLOADED";

// ==================
// Shared State
// ==================

/// State for the `/files` routes
pub struct FilesState {
    pub store: Arc<RecordStore>,
    pub avatars: AvatarStore,
    pub image_host: Arc<dyn ImageHost>,
    pub upload_limit: u64,
}

/// State for `PATCH /users/:id/avatar`
pub struct AvatarState {
    pub users: ResourceRepository,
    pub avatars: AvatarStore,
    pub upload_limit: u64,
}

// ==================
// Files Routes
// ==================

/// Create export and upload routes
pub fn files_routes(state: Arc<FilesState>) -> Router {
    Router::new()
        .route("/booksJSON", get(books_json_handler))
        .route("/CSV", get(books_csv_handler))
        .route("/PDF", get(books_pdf_handler))
        .route("/single", post(upload_single_handler))
        .route("/multiple", post(upload_multiple_handler))
        .route("/cloudinary", post(upload_hosted_handler))
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT))
        .with_state(state)
}

/// Create the user avatar route, to be merged into the users router
pub fn avatar_routes(state: Arc<AvatarState>) -> Router {
    Router::new()
        .route("/:id/avatar", patch(user_avatar_handler))
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT))
        .with_state(state)
}

// ==================
// Export Handlers
// ==================

async fn books_json_handler(State(state): State<Arc<FilesState>>) -> ApiResult<Response> {
    let source = state.store.open_record_sequence(BOOKS).await?;
    let pipeline = ExportPipeline::new(source, Transform::Compress);
    Ok(attachment(pipeline, Transform::Compress.content_type(), "books.json.gz"))
}

async fn books_csv_handler(State(state): State<Arc<FilesState>>) -> ApiResult<Response> {
    let source = state.store.open_record_sequence(BOOKS).await?;
    let transform = Transform::tabular(CSV_FIELDS);
    let content_type = transform.content_type();
    Ok(attachment(ExportPipeline::new(source, transform), content_type, "books.csv"))
}

async fn books_pdf_handler(State(state): State<Arc<FilesState>>) -> ApiResult<Response> {
    let books = state.store.load(BOOKS).await?;
    let transform = Transform::Documentize(DocumentLayout::books_table());
    let content_type = transform.content_type();
    Ok(attachment(ExportPipeline::new(books, transform), content_type, "books.pdf"))
}

/// Stream a pipeline's output as a downloadable file
fn attachment(mut pipeline: ExportPipeline, content_type: &'static str, file_name: &str) -> Response {
    let (mut writer, reader) = tokio::io::duplex(EXPORT_BUFFER);
    let export = tokio::spawn(async move { pipeline.run(&mut writer).await });

    let outcome = stream::once(async move {
        match export.await {
            Ok(Ok(summary)) => {
                debug!(records = summary.records, bytes = summary.bytes_written, "export sent");
                None
            }
            Ok(Err(err)) => Some(Err::<Bytes, _>(io::Error::other(err))),
            Err(join) => Some(Err(io::Error::other(join))),
        }
    })
    .filter_map(future::ready);

    let body = Body::from_stream(ReaderStream::new(reader).chain(outcome));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

// ==================
// Upload Handlers
// ==================

async fn upload_single_handler(
    State(state): State<Arc<FilesState>>,
    mut multipart: Multipart,
) -> ApiResult<&'static str> {
    let file = single_file(&mut multipart, "avatar", state.upload_limit).await?;

    let stem = Uuid::new_v4().simple().to_string();
    state
        .avatars
        .save(&name_with_extension(&stem, &file.file_name), &file.data)
        .await?;

    Ok(UPLOADED)
}

async fn upload_multiple_handler(
    State(state): State<Arc<FilesState>>,
    mut multipart: Multipart,
) -> ApiResult<&'static str> {
    let files = collect_files(&mut multipart, "avatars").await?;
    if files.is_empty() {
        return Err(UploadError::MissingFile("avatars".to_string()).into());
    }
    for file in &files {
        file.check_size(state.upload_limit)?;
    }

    let saves = files
        .iter()
        .map(|file| state.avatars.save(&file.file_name, &file.data));
    future::try_join_all(saves).await?;

    Ok(UPLOADED)
}

async fn upload_hosted_handler(
    State(state): State<Arc<FilesState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<HostedImage>> {
    let file = single_file(&mut multipart, "avatar", state.upload_limit).await?;
    let hosted = state.image_host.upload(DEFAULT_FOLDER, &file).await?;
    Ok(Json(hosted))
}

async fn user_avatar_handler(
    State(state): State<Arc<AvatarState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<Record>> {
    // Unknown users are rejected before anything is written
    state.users.get_by_id(&id).await?;

    let file = single_file(&mut multipart, "avatar", state.upload_limit).await?;
    let url = state
        .avatars
        .save(&name_with_extension(&id, &file.file_name), &file.data)
        .await?;

    let mut payload = Payload::new();
    payload.insert("avatar".to_string(), Value::String(url));
    let updated = state.users.replace_by_id(&id, payload).await?;

    Ok(Json(updated))
}

// ==================
// Helper Functions
// ==================

/// Every file sent under `field_name`
async fn collect_files(multipart: &mut Multipart, field_name: &str) -> UploadResult<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Malformed(e.body_text()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| UploadError::Malformed(e.body_text()))?;

        files.push(UploadedFile {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    Ok(files)
}

/// The first file under `field_name`, within `limit` bytes
async fn single_file(multipart: &mut Multipart, field_name: &str, limit: u64) -> UploadResult<UploadedFile> {
    let file = collect_files(multipart, field_name)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| UploadError::MissingFile(field_name.to_string()))?;
    file.check_size(limit)?;
    Ok(file)
}
