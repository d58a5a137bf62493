//! Sonic Core Library
//!
//! This crate provides the settings document model, tool decoding, shared models,
//! error types and configuration used by every Sonic gateway component.

pub mod config;
pub mod error;
pub mod models;
pub mod settings;
pub mod timecode;
pub mod tool;

// Re-export commonly used types
pub use config::{GatewayConfig, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AudioFile, AudioResult};
pub use settings::{ConfigError, ConfigMap, SettingValue};
pub use tool::{BoostMode, CompressPolicy, MetadataTags, ToolInvocation, ToolKind, TrimMode};
