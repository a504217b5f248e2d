#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use deskline_api::auth::session::SessionConfig;
use deskline_api::config::ServerConfig;
use deskline_api::router::build_app_router;
use deskline_api::state::AppState;
use deskline_api::upload::{UploadConfig, UploadStore};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

const BOUNDARY: &str = "deskline-test-boundary";

/// Build a test `ServerConfig` with safe defaults, storing uploads in `upload_dir`.
pub fn test_config(upload_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        min_password_length: 8,
        online_window_secs: 300,
        session: SessionConfig {
            secret: "integration-test-secret".to_string(),
            ttl_hours: 24,
            cookie_secure: false,
        },
        upload: UploadConfig {
            dir: upload_dir.to_path_buf(),
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "pdf"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_bytes: 10 * 1024 * 1024,
        },
    }
}

/// The application router plus the temporary upload directory it writes to.
///
/// The directory is deleted when this value is dropped, so keep it alive for
/// the whole test.
pub struct TestApp {
    pub router: Router,
    pub upload_dir: TempDir,
}

impl TestApp {
    /// A fresh handle to the router for one `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn upload_path(&self, filename: &str) -> std::path::PathBuf {
        self.upload_dir.path().join(filename)
    }

    /// Number of entries in the upload directory.
    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .expect("upload dir should be readable")
            .count()
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// over the given pool and a fresh upload directory.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("tempdir should be created");
    let config = test_config(upload_dir.path());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        uploads: Arc::new(UploadStore::new(&config.upload)),
    };

    TestApp {
        router: build_app_router(state, &config),
        upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn with_token(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(t) => builder.header(header::AUTHORIZATION, format!("Bearer {t}")),
        None => builder,
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should be handled")
}

pub async fn get(app: Router, uri: &str) -> Response {
    get_auth(app, uri, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: Option<&str>) -> Response {
    let request = with_token(Request::builder().uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST an `application/x-www-form-urlencoded` body.
pub async fn post_form(app: Router, uri: &str, body: &str, token: Option<&str>) -> Response {
    let request = with_token(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
        token,
    )
    .body(Body::from(body.to_string()))
    .unwrap();
    send(app, request).await
}

/// A file part for [`post_multipart`]: form field, filename, contents.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

/// POST a `multipart/form-data` body with text fields and an optional file.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<FilePart<'_>>,
    token: Option<&str>,
) -> Response {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                file.field, file.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = with_token(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ),
        token,
    )
    .body(Body::from(body))
    .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Domain helpers
// ---------------------------------------------------------------------------

/// Register `username` with [`TEST_PASSWORD`] and return the session token.
pub async fn register(app: Router, username: &str) -> String {
    let response = post_form(
        app,
        "/register",
        &format!("username={username}&password={TEST_PASSWORD}"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration of {username} should succeed");
    let json = body_json(response).await;
    json["data"]["token"]
        .as_str()
        .expect("register response should carry a token")
        .to_string()
}

/// File a ticket through `POST /tickets/new` and return its JSON detail.
pub async fn file_ticket(
    app: Router,
    title: &str,
    submitted_by: &str,
    token: Option<&str>,
) -> serde_json::Value {
    let body = format!("title={title}&description=Steps+to+reproduce&submitted_by={submitted_by}");
    let response = post_form(app, "/tickets/new", &body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
