//! Application setup and initialization
//!
//! Everything `main` needs to go from configuration to a running router, kept out of
//! the binary so tests can build the same router around their own engine.

pub mod routes;
pub mod server;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use sonic_core::GatewayConfig;
use sonic_engine::GrpcAudioEngine;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: GatewayConfig) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(environment = %config.environment, "Configuration loaded and validated successfully");

    let engine = GrpcAudioEngine::from_config(&config).context("Failed to configure audio engine client")?;
    let state = Arc::new(AppState::new(config, Arc::new(engine)));

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}
