//! Common test utilities for E2E testing.
//!
//! The fixture wires a real router to in-process dependencies: SQLite
//! stores on a temp file, the in-memory queue and object store, and a
//! running worker. No external infrastructure is needed.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use darkroom_core::{
    AuthConfig, AuthMethod, Authenticator, Config, DatabaseConfig, ImageWorker, JobQueue,
    MemoryJobQueue, MemoryObjectStore, ObjectStore, ObjectStoreConfig, ServerConfig,
    SqliteTaskStore, SqliteUserStore, TaskOrchestrator, TaskStore, TokenAuthenticator,
    TokenSigner, UserStore,
};
use darkroom_server::api::create_router;
use darkroom_server::state::AppState;

pub const TEST_SECRET: &str = "e2e-test-secret";

/// Test fixture running the full service in-process.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Object store shared with the worker
    pub objects: Arc<MemoryObjectStore>,
    /// Worker handle, kept alive for the fixture's lifetime
    pub worker: Arc<ImageWorker>,
    /// Temp dir holding the SQLite database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub bytes: Vec<u8>,
}

impl TestFixture {
    /// Fixture with token auth and a running worker.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let users: Arc<dyn UserStore> =
            Arc::new(SqliteUserStore::new(&db_path).expect("Failed to create user store"));
        let tasks: Arc<dyn TaskStore> =
            Arc::new(SqliteTaskStore::new(&db_path).expect("Failed to create task store"));
        let objects = Arc::new(MemoryObjectStore::new());
        let queue: Arc<dyn JobQueue> = Arc::new(MemoryJobQueue::new());

        let worker = Arc::new(ImageWorker::new(
            Arc::clone(&queue),
            Arc::clone(&objects) as Arc<dyn ObjectStore>,
            Arc::clone(&tasks),
        ));
        worker.start().await;

        let orchestrator = Arc::new(TaskOrchestrator::new(
            Arc::clone(&queue),
            Arc::clone(&tasks),
            Arc::clone(&objects) as Arc<dyn ObjectStore>,
        ));

        let signer = Arc::new(TokenSigner::new(TEST_SECRET.to_string(), 60));
        let authenticator: Arc<dyn Authenticator> = Arc::new(TokenAuthenticator::new(
            Arc::clone(&signer),
            Arc::clone(&users),
        ));

        let config = Config {
            auth: AuthConfig {
                method: AuthMethod::Token,
                secret: Some(TEST_SECRET.to_string()),
                token_ttl_minutes: 60,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            object_store: ObjectStoreConfig::default(),
        };

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            Some(signer),
            users,
            orchestrator,
        ));
        let router = create_router(state);

        Self {
            router,
            objects,
            worker,
            temp_dir,
        }
    }

    /// Send a GET request, optionally with a bearer token.
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Upload files as multipart form data with a transformation field.
    pub async fn upload(
        &self,
        files: &[(&str, Vec<u8>)],
        transformation: &str,
        token: Option<&str>,
    ) -> TestResponse {
        let boundary = "----darkroom-test-boundary";
        let mut body = Vec::new();

        for (name, bytes) in files {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"transformation\"\r\n\r\n",
        );
        body.extend_from_slice(transformation.as_bytes());
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/image/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            );
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body)).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            body,
            bytes,
        }
    }

    /// Register a user and log in, returning (user_id, token).
    pub async fn register_and_login(&self, email: &str) -> (String, String) {
        let response = self
            .post(
                "/auth/registration",
                serde_json::json!({
                    "email": email,
                    "first_name": "Test",
                    "last_name": "User",
                    "password": "password123",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        let user_id = response.body["id"].as_str().unwrap().to_string();

        let response = self
            .post(
                "/auth/login",
                serde_json::json!({
                    "email": email,
                    "password": "password123",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        let token = response.body["access_token"].as_str().unwrap().to_string();

        (user_id, token)
    }

    /// Poll a job until it reaches a terminal state or give up.
    pub async fn wait_for_success(&self, job_id: &str, token: &str) -> TestResponse {
        for _ in 0..200 {
            let response = self.get(&format!("/image/status/{job_id}"), Some(token)).await;
            if response.status == StatusCode::OK {
                match response.body["status"].as_str() {
                    Some("SUCCESS") | Some("FAILURE") => return response,
                    _ => {}
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("job {job_id} did not reach a terminal state");
    }
}

/// A small valid PNG generated in memory.
pub fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 40) as u8, (y * 40) as u8, 128])
    });
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("Failed to encode test image");
    buffer.into_inner()
}
