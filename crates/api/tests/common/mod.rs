#![allow(dead_code)]

//! Shared helpers for the API integration tests.
//!
//! Mirrors the router construction in `main.rs` so integration tests
//! exercise the same middleware stack (CORS, request ID, timeout,
//! tracing, panic recovery) that production uses. Also provides small
//! builders for test fixtures: configs, tasks, and zip archives.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use zip::write::SimpleFileOptions;

use panomax_api::config::{ForgeConfig, ServerConfig};
use panomax_api::routes;
use panomax_api::state::AppState;
use panomax_core::{RenderTask, TaskKind};

/// Build a test `ServerConfig` pointing at the given Forge base URL
/// and public directory.
///
/// Tests pass the address of a local mock server as `forge_base_url`
/// and a tempdir as `public_dir`; no test ever talks to the real
/// service.
pub fn test_config(forge_base_url: &str, public_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_url: "http://localhost:8080".to_string(),
        public_dir: public_dir.to_path_buf(),
        cors_origins: vec!["http://localhost:8080".to_string()],
        request_timeout_secs: 30,
        sweep_interval_secs: 300,
        task_ttl_secs: 3600,
        forge: ForgeConfig {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            base_url: forge_base_url.trim_end_matches('/').to_string(),
            bucket: "store_for_da_max".to_string(),
            activity_id: "Denix.RenderAllCamerasWithScriptParam+test".to_string(),
            input_asset_url: format!("{forge_base_url}/assets/radiosity.max"),
        },
    }
}

/// Build the full application state from a test config.
pub fn build_test_state(forge_base_url: &str, public_dir: &Path) -> AppState {
    AppState::from_config(test_config(forge_base_url, public_dir))
}

/// Build the full application router with all middleware layers around
/// the given state.
pub fn build_test_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:8080".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    routes::router(&state.config.public_dir)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Serve a router on an ephemeral local port and return its base URL.
///
/// Used to stand in for the Forge endpoints and the artifact host;
/// the server task runs until the test process exits.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server error");
    });
    format!("http://{addr}")
}

/// Issue a GET request against the app without going through the network.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a raw string body and JSON content type.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Response body is not valid JSON")
}

/// Poll until the registry holds no tasks, panicking after `timeout`.
///
/// Callback completion work runs on a detached task, so tests that
/// assert reclamation wait for it rather than racing it.
pub async fn wait_for_empty_registry(state: &AppState, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    while state.registry.task_count().await != 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Registry was not reclaimed within {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Build a well-formed rendering task fixture.
pub fn rendering_task(task_id: u64) -> RenderTask {
    RenderTask {
        task_id,
        kind: TaskKind::Rendering,
        position: [0.0, 0.0, 0.0],
        rotation: Some([0.0, 0.0, 0.0, 1.0]),
        fov: 60.0,
        rendering_size: [800, 600],
    }
}

/// Build an in-memory zip archive from (name, content) entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), options)
                .expect("Failed to start zip entry");
            writer.write_all(content).expect("Failed to write zip entry");
        }
        writer.finish().expect("Failed to finish zip");
    }
    cursor.into_inner()
}
