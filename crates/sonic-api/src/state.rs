//! Application state shared by every request.

use std::sync::Arc;

use sonic_core::GatewayConfig;
use sonic_engine::AudioEngine;
use sonic_processing::UploadLimits;

/// Read-only after startup.
pub struct AppState {
    pub config: GatewayConfig,
    pub limits: UploadLimits,
    pub engine: Arc<dyn AudioEngine>,
}

impl AppState {
    pub fn new(config: GatewayConfig, engine: Arc<dyn AudioEngine>) -> Self {
        Self {
            limits: UploadLimits::from_config(&config),
            config,
            engine,
        }
    }
}
