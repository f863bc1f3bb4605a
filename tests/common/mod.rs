#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use screen_catalog::routes::create_routes;
use screen_catalog::services::media::{LocalStore, MediaStore};
use screen_catalog::state::{AppState, UploadLimits};

pub const PUBLIC_STORAGE: &str = "http://localhost:3000/storage";
pub const DEFAULT_MAX_UPLOAD: usize = 2048 * 1024;

/// Smallest byte strings `image::guess_format` recognises.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0\x01";

const BOUNDARY: &str = "screen-catalog-test-boundary";

/// The application wired to an in-memory SQLite database and a temporary
/// upload directory. Dropping it removes the directory.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    storage: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_upload_limit(DEFAULT_MAX_UPLOAD).await
    }

    pub async fn with_upload_limit(max_bytes: usize) -> Self {
        let mut options = ConnectOptions::new("sqlite::memory:");
        // Every pooled connection would get its own in-memory database.
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .expect("in-memory database should open");
        Migrator::up(&db, None)
            .await
            .expect("migrations should apply");

        let storage = tempfile::tempdir().expect("temp dir should be created");
        let media = MediaStore::Local(LocalStore::new(storage.path(), PUBLIC_STORAGE));

        let state = AppState {
            db: db.clone(),
            media,
            limits: UploadLimits { max_bytes },
        };

        Self {
            router: create_routes(state, &[]),
            db,
            storage,
        }
    }

    /// Disk location of a file served under [`PUBLIC_STORAGE`].
    pub fn stored_path(&self, url: &str) -> PathBuf {
        let key = url
            .strip_prefix(&format!("{PUBLIC_STORAGE}/"))
            .unwrap_or_else(|| panic!("{url} is not a local storage url"));
        self.storage.path().join(key)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should not fail")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::delete(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn json(&self, method: Method, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.json(Method::POST, uri, body).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.json(Method::PUT, uri, body).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
        files: &[FilePart<'_>],
    ) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(fields, files)))
                .unwrap(),
        )
        .await
    }

    /// Creates a project through the API and returns its `data` object.
    pub async fn create_project(&self, name: &str) -> Value {
        let response = self
            .post_json("/api/projects", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(response.status(), 201, "project creation should succeed");
        body_json(response).await["data"].clone()
    }

    pub async fn create_category(&self, project_id: &str, name: &str) -> Value {
        let response = self
            .post_json(
                &format!("/api/projects/{project_id}/categories"),
                serde_json::json!({ "name": name }),
            )
            .await;
        assert_eq!(response.status(), 201, "category creation should succeed");
        body_json(response).await["data"].clone()
    }

    pub async fn create_screen(&self, project_id: &str, category_id: &str, title: &str) -> Value {
        let response = self
            .multipart(
                Method::POST,
                "/api/screens",
                &[
                    ("project_id", project_id),
                    ("category_id", category_id),
                    ("title", title),
                ],
                &[],
            )
            .await;
        assert_eq!(response.status(), 201, "screen creation should succeed");
        body_json(response).await["data"].clone()
    }
}

pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

impl<'a> FilePart<'a> {
    pub fn png(field: &'a str) -> Self {
        Self {
            field,
            file_name: "screen.png",
            content_type: "image/png",
            data: PNG,
        }
    }
}

fn multipart_body(fields: &[(&str, &str)], files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    for file in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub fn id_of(entity: &Value) -> String {
    entity["id"]
        .as_str()
        .expect("entity should carry a string id")
        .to_string()
}
