//! Configuration module
//!
//! Gateway configuration is read once at startup from the environment (after loading an
//! optional `.env` file) and is read-only afterwards.

use std::env;
use std::time::Duration;

const MIB: usize = 1024 * 1024;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_UPLOAD_SIZE_MB: usize = 50;
const MAX_FILES: usize = 10;
const MULTIPART_MEMORY_MB: usize = 32;
const MULTIPART_OVERHEAD_MB: usize = 10;
const MAX_SETTINGS_KB: usize = 64;
const ENGINE_ADDR: &str = "rust-audio:50051";
const ENGINE_TIMEOUT_SECS: u64 = 60;
const ENGINE_CONNECT_TIMEOUT_SECS: u64 = 10;
const ENGINE_MAX_MESSAGE_MB: usize = 100;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Tracing output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    pub http_concurrency_limit: usize,
    // Upload limits
    pub max_upload_size_bytes: usize,
    pub max_files: usize,
    pub multipart_memory_bytes: usize,
    pub multipart_overhead_bytes: usize,
    pub max_settings_bytes: usize,
    // Remote audio engine
    pub engine_addr: String,
    pub engine_timeout_secs: u64,
    pub engine_connect_timeout_secs: u64,
    pub engine_max_message_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            log_format: LogFormat::Compact,
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * MIB,
            max_files: MAX_FILES,
            multipart_memory_bytes: MULTIPART_MEMORY_MB * MIB,
            multipart_overhead_bytes: MULTIPART_OVERHEAD_MB * MIB,
            max_settings_bytes: MAX_SETTINGS_KB * 1024,
            engine_addr: normalize_engine_addr(ENGINE_ADDR),
            engine_timeout_secs: ENGINE_TIMEOUT_SECS,
            engine_connect_timeout_secs: ENGINE_CONNECT_TIMEOUT_SECS,
            engine_max_message_bytes: ENGINE_MAX_MESSAGE_MB * MIB,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        let server_port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let engine_addr = lookup("RUST_AUDIO_ADDR")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| ENGINE_ADDR.to_string());

        Ok(Self {
            server_port,
            environment,
            cors_origins,
            log_format,
            http_concurrency_limit: parse_or(&lookup, "HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT)
                .max(1),
            max_upload_size_bytes: parse_or(&lookup, "MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB)
                .saturating_mul(MIB),
            max_files: parse_or(&lookup, "MAX_FILES", MAX_FILES),
            multipart_memory_bytes: parse_or(&lookup, "MULTIPART_MEMORY_MB", MULTIPART_MEMORY_MB)
                .saturating_mul(MIB),
            multipart_overhead_bytes: parse_or(
                &lookup,
                "MULTIPART_OVERHEAD_MB",
                MULTIPART_OVERHEAD_MB,
            )
            .saturating_mul(MIB),
            max_settings_bytes: parse_or(&lookup, "MAX_SETTINGS_KB", MAX_SETTINGS_KB)
                .saturating_mul(1024),
            engine_addr: normalize_engine_addr(&engine_addr),
            engine_timeout_secs: parse_or(&lookup, "ENGINE_TIMEOUT_SECS", ENGINE_TIMEOUT_SECS),
            engine_connect_timeout_secs: parse_or(
                &lookup,
                "ENGINE_CONNECT_TIMEOUT_SECS",
                ENGINE_CONNECT_TIMEOUT_SECS,
            ),
            engine_max_message_bytes: parse_or(
                &lookup,
                "ENGINE_MAX_MESSAGE_MB",
                ENGINE_MAX_MESSAGE_MB,
            )
            .saturating_mul(MIB),
        })
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Hard cap on the whole request body: the files ceiling plus framing allowance.
    pub fn body_ceiling_bytes(&self) -> usize {
        self.max_upload_size_bytes
            .saturating_add(self.multipart_overhead_bytes)
    }

    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }

    pub fn engine_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_connect_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// tonic endpoints need a scheme; the engine address is usually given as `host:port`.
fn normalize_engine_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<GatewayConfig, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_gateway_limits() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port, 4000);
        assert_eq!(config.max_files, 10);
        assert_eq!(config.max_upload_size_bytes, 50 * MIB);
        assert_eq!(config.multipart_memory_bytes, 32 * MIB);
        assert_eq!(config.engine_addr, "http://rust-audio:50051");
        assert_eq!(config.engine_timeout(), Duration::from_secs(60));
        assert_eq!(config.engine_max_message_bytes, 100 * MIB);
        assert_eq!(config.http_concurrency_limit, 10_000);
        assert_eq!(config.body_ceiling_bytes(), 60 * MIB);
        assert!(!config.is_production());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("RUST_AUDIO_ADDR", "https://engine.internal:443"),
            ("MAX_FILES", "3"),
            ("ENVIRONMENT", "Production"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.engine_addr, "https://engine.internal:443");
        assert_eq!(config.max_files, 3);
        assert!(config.is_production());
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn unparsable_limits_fall_back() {
        let config = config_from(&[("MAX_UPLOAD_SIZE_MB", "lots"), ("APP_ENV", "staging")]).unwrap();
        assert_eq!(config.max_upload_size_bytes, 50 * MIB);
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "http")]).is_err());
    }
}
