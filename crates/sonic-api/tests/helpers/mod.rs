//! Test helpers: build the real router around an in-memory audio engine.
//!
//! Run from workspace root: `cargo test -p sonic-api --test upload_test`.

#![allow(dead_code)]

pub mod engine;
pub mod fixtures;

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use axum_test::TestServer;
use sonic_api::setup::routes;
use sonic_api::state::AppState;
use sonic_core::GatewayConfig;
use sonic_engine::AudioEngine;
use tower::ServiceExt;

pub use engine::{EngineCall, GatedEngine, RecordingEngine};
pub use fixtures::UploadForm;

/// Test application: the router, an axum-test server over it, and the engine double.
pub struct TestApp {
    pub server: TestServer,
    pub router: Router,
    pub engine: Arc<RecordingEngine>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.engine.calls()
    }

    /// `POST /upload` with the form's exact length.
    pub async fn upload(&self, form: UploadForm) -> CapturedResponse {
        self.send(form.into_request()).await
    }

    pub async fn send(&self, request: Request<Body>) -> CapturedResponse {
        send(self.router.clone(), request).await
    }
}

/// Status, headers and the fully read body of one response.
#[derive(Debug)]
pub struct CapturedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl CapturedResponse {
    async fn read(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Failed to read response body");
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> HeaderValue {
        self.headers
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("Missing response header {name}"))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.body
    }
}

/// Drive one request through the router in-process.
pub async fn send(router: Router, request: Request<Body>) -> CapturedResponse {
    let response = router
        .oneshot(request)
        .await
        .expect("Router call failed");
    CapturedResponse::read(response).await
}

pub fn build_router(config: GatewayConfig, engine: Arc<dyn AudioEngine>) -> Router {
    let state = Arc::new(AppState::new(config.clone(), engine));
    routes::setup_routes(&config, state).expect("Failed to build routes")
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(GatewayConfig::default(), RecordingEngine::default())
}

pub fn setup_test_app_with(config: GatewayConfig, engine: RecordingEngine) -> TestApp {
    let engine = Arc::new(engine);
    let router = build_router(config, engine.clone());
    let server =
        TestServer::new(router.clone().into_make_service()).expect("Failed to create test server");
    TestApp {
        server,
        router,
        engine,
    }
}

/// Config with tiny upload limits so ceiling tests stay small.
pub fn small_limits_config(max_upload: usize, overhead: usize) -> GatewayConfig {
    GatewayConfig {
        max_upload_size_bytes: max_upload,
        multipart_overhead_bytes: overhead,
        multipart_memory_bytes: max_upload / 2,
        ..GatewayConfig::default()
    }
}
