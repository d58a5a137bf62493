//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use sonic_core::GatewayConfig;

/// Validate critical configuration values
pub fn validate_config(config: &GatewayConfig) -> Result<()> {
    if config.is_production() && config.cors_origins.iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via the CORS_ORIGINS environment variable."
        ));
    }

    if config.max_files == 0 {
        return Err(anyhow::anyhow!("MAX_FILES cannot be 0"));
    }

    if config.max_upload_size_bytes == 0 {
        return Err(anyhow::anyhow!("Max upload size cannot be 0"));
    }

    if config.engine_max_message_bytes < config.max_upload_size_bytes {
        return Err(anyhow::anyhow!(
            "Engine max message size ({} bytes) is smaller than the upload ceiling ({} bytes)",
            config.engine_max_message_bytes,
            config.max_upload_size_bytes
        ));
    }

    if config.engine_timeout_secs == 0 {
        return Err(anyhow::anyhow!("Engine timeout cannot be 0"));
    }

    if config.multipart_memory_bytes > config.max_upload_size_bytes {
        tracing::warn!(
            multipart_memory_bytes = config.multipart_memory_bytes,
            max_upload_size_bytes = config.max_upload_size_bytes,
            "Multipart memory budget exceeds the upload ceiling - uploads will never spill to disk"
        );
    }

    Ok(())
}
