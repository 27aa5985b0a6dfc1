//! HTTP surface tests
//!
//! Requests go straight into the router with `oneshot`; collections and
//! uploads land in a temporary directory.

use std::io::Read;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use bookshelf::http_server::{HttpServer, ServerConfig};
use bookshelf::store::RecordStore;
use bookshelf::upload::UnconfiguredImageHost;

const BOUNDARY: &str = "bookshelf-test-boundary";

struct TestApp {
    dir: TempDir,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            data_dir: dir.path().join("data"),
            public_dir: dir.path().join("public"),
            upload_limit_bytes: 64,
            ..ServerConfig::default()
        };
        let store = Arc::new(RecordStore::local(&config.data_dir));
        let server = HttpServer::with_parts(config, store, Arc::new(UnconfiguredImageHost));
        server.initialize().await.unwrap();

        Self {
            router: server.router(),
            dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, _, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_book(&self, title: &str, category: &str, asin: &str) -> String {
        let (status, body) = self
            .json(
                Method::POST,
                "/books",
                Some(json!({"title": title, "category": category, "asin": asin})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    async fn export(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }
}

fn multipart(method: Method, uri: &str, files: &[(&str, &str, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    for (field, file_name, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

// =============================================================================
// BOOKS CRUD
// =============================================================================

#[tokio::test]
async fn test_dune_round_trip() {
    let app = TestApp::new().await;

    let (status, created) = app
        .json(Method::POST, "/books", Some(json!({"title": "Dune", "category": "sci-fi"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, book) = app.json(Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["id"], json!(id));
    assert_eq!(book["title"], "Dune");
    assert_eq!(book["category"], "sci-fi");
    let created_at = book["createdAt"].clone();
    assert!(created_at.is_string());

    let (status, book) = app
        .json(
            Method::PUT,
            &format!("/books/{}", id),
            Some(json!({"category": "classic-sci-fi"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["title"], "Dune");
    assert_eq!(book["category"], "classic-sci-fi");
    assert_eq!(book["createdAt"], created_at);
    assert!(book["updatedAt"].is_string());

    let (status, body) = app.json(Method::DELETE, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = app.json(Method::GET, &format!("/books/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert_eq!(body["error"], format!("Book with id {} not found!", id));
}

#[tokio::test]
async fn test_invalid_book_lists_violations() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(Method::POST, "/books", Some(json!({"category": 3})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    let fields: Vec<_> = body["errorsList"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["title".to_string(), "category".to_string()]);

    let (_, books) = app.json(Method::GET, "/books", None).await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new().await;

    let request = Request::post("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_category_filter() {
    let app = TestApp::new().await;
    app.create_book("Dune", "sci-fi", "1").await;
    app.create_book("Emma", "classic", "2").await;
    app.create_book("Solaris", "sci-fi", "3").await;

    let (status, books) = app.json(Method::GET, "/books?category=sci-fi", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = books.as_array().unwrap().iter().map(|b| b["title"].clone()).collect();
    assert_eq!(titles, vec![json!("Dune"), json!("Solaris")]);

    let (_, all) = app.json(Method::GET, "/books", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_blank_category_lists_everything() {
    let app = TestApp::new().await;
    app.create_book("Dune", "sci-fi", "1").await;

    let (status, books) = app.json(Method::GET, "/books?category=", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_unknown_book_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app
        .json(Method::PUT, "/books/nope", Some(json!({"title": "x"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// USERS
// =============================================================================

#[tokio::test]
async fn test_users_have_no_validation() {
    let app = TestApp::new().await;

    let (status, created) = app
        .json(Method::POST, "/users", Some(json!({"name": "Ada"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_str().unwrap();
    let (status, user) = app.json(Method::GET, &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Ada");
}

#[tokio::test]
async fn test_user_avatar_upload_is_served_back() {
    let app = TestApp::new().await;
    let (_, created) = app
        .json(Method::POST, "/users", Some(json!({"name": "Ada"})))
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    let request = multipart(
        Method::PATCH,
        &format!("/users/{}/avatar", id),
        &[("avatar", "me.png", "PNGDATA")],
    );
    let (status, _, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let user: Value = serde_json::from_slice(&body).unwrap();
    let url = format!("/img/users/{}.png", id);
    assert_eq!(user["avatar"], json!(url));
    assert_eq!(user["name"], "Ada");
    assert!(user["updatedAt"].is_string());

    let (status, _, served) = app.export(&url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, b"PNGDATA");
}

#[tokio::test]
async fn test_avatar_for_unknown_user_is_not_found() {
    let app = TestApp::new().await;
    let request = multipart(Method::PATCH, "/users/ghost/avatar", &[("avatar", "me.png", "x")]);
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!app.dir.path().join("public/img/users").exists());
}

// =============================================================================
// EXPORTS
// =============================================================================

#[tokio::test]
async fn test_csv_export() {
    let app = TestApp::new().await;
    app.create_book("Dune", "sci-fi", "B001").await;
    app.create_book("Emma", "classic", "B002").await;

    let (status, headers, body) = app.export("/files/CSV").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(headers[header::CONTENT_DISPOSITION], "attachment; filename=books.csv");

    let text = String::from_utf8(body).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("asin") && lines[0].contains("title") && lines[0].contains("category"));
    assert!(lines[1].contains("Dune"));
    assert!(lines[2].contains("Emma"));
}

#[tokio::test]
async fn test_gzip_export_decodes_to_collection() {
    let app = TestApp::new().await;
    app.create_book("Dune", "sci-fi", "B001").await;

    let (status, headers, body) = app.export("/files/booksJSON").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/gzip");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=books.json.gz"
    );

    let mut json = String::new();
    flate2::read::GzDecoder::new(body.as_slice())
        .read_to_string(&mut json)
        .unwrap();
    let books: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(books.as_array().unwrap().len(), 1);
    assert_eq!(books[0]["title"], "Dune");
}

#[tokio::test]
async fn test_pdf_export() {
    let app = TestApp::new().await;
    app.create_book("Dune", "sci-fi", "B001").await;

    let (status, headers, body) = app.export("/files/PDF").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_export_failing_mid_stream_aborts_body() {
    let app = TestApp::new().await;
    std::fs::write(
        app.dir.path().join("data/books.json"),
        r#"[{"asin":"1","title":"Dune","category":"sci-fi"}, {"title":"#,
    )
    .unwrap();

    let request = Request::get("/files/CSV").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    // Headers were already sent; the failure has to surface in the body
    assert_eq!(response.status(), StatusCode::OK);
    assert!(to_bytes(response.into_body(), usize::MAX).await.is_err());
}

#[tokio::test]
async fn test_export_of_missing_collection_is_server_error() {
    let app = TestApp::new().await;
    std::fs::remove_file(app.dir.path().join("data/books.json")).unwrap();

    let (status, _, body) = app.export("/files/CSV").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], 500);
}

// =============================================================================
// UPLOADS
// =============================================================================

#[tokio::test]
async fn test_single_upload() {
    let app = TestApp::new().await;

    let request = multipart(Method::POST, "/files/single", &[("avatar", "cat.png", "meow")]);
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"UPLOADED");

    let stored: Vec<_> = std::fs::read_dir(app.dir.path().join("public/img/users"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].ends_with(".png"));
}

#[tokio::test]
async fn test_single_upload_over_limit() {
    let app = TestApp::new().await;
    let big = "x".repeat(65);

    let request = multipart(Method::POST, "/files/single", &[("avatar", "big.png", &big)]);
    let (status, _, _) = app.send(request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_single_upload_without_file() {
    let app = TestApp::new().await;

    let request = multipart(Method::POST, "/files/single", &[("other", "cat.png", "meow")]);
    let (status, _, _) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_multiple_upload_keeps_names() {
    let app = TestApp::new().await;

    let request = multipart(
        Method::POST,
        "/files/multiple",
        &[("avatars", "one.png", "1"), ("avatars", "../two.png", "2")],
    );
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"UPLOADED");
    let dir = app.dir.path().join("public/img/users");
    assert_eq!(std::fs::read(dir.join("one.png")).unwrap(), b"1");
    assert_eq!(std::fs::read(dir.join("two.png")).unwrap(), b"2");
}

#[tokio::test]
async fn test_multiple_upload_applies_limit_to_each_file() {
    let app = TestApp::new().await;
    let big = "x".repeat(65);

    let request = multipart(
        Method::POST,
        "/files/multiple",
        &[("avatars", "small.png", "1"), ("avatars", "big.png", &big)],
    );
    let (status, _, _) = app.send(request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!app.dir.path().join("public/img/users/small.png").exists());
}

#[tokio::test]
async fn test_hosted_upload_without_host_fails() {
    let app = TestApp::new().await;

    let request = multipart(Method::POST, "/files/cloudinary", &[("avatar", "cat.png", "meow")]);
    let (status, _, body) = app.send(request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], 500);
}
