//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sonic_core::GatewayConfig;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ERROR_CODE_HEADER;
use crate::handlers;
use crate::middleware::{request_id::REQUEST_ID_HEADER, request_id_middleware};
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &GatewayConfig, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Multipart reads past this are rejected by axum; the upload handler turns that into a 400.
    let body_limit = usize::try_from(state.limits.body_ceiling).unwrap_or(usize::MAX);

    tracing::info!(
        http_concurrency_limit = config.http_concurrency_limit,
        body_limit,
        "HTTP limits configured"
    );

    let app = Router::new()
        .route("/upload", post(handlers::upload::upload))
        .route("/health", get(handlers::health::liveness_check))
        .layer(DefaultBodyLimit::max(body_limit))
        // Router::layer wraps each route separately; the shared semaphore keeps the cap server-wide.
        .layer(GlobalConcurrencyLimitLayer::new(config.http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &GatewayConfig) -> Result<CorsLayer, anyhow::Error> {
    let exposed: [HeaderName; 3] = [
        header::CONTENT_DISPOSITION,
        ERROR_CODE_HEADER,
        REQUEST_ID_HEADER,
    ];
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        if !config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
            .expose_headers(exposed)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
            .expose_headers(exposed)
    };
    Ok(cors)
}
