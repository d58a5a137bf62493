//! Error types module
//!
//! This module provides the unified error type for the gateway. Every component error
//! (upload validation, settings, file ordering, payload reads, remote engine calls)
//! converts into `AppError`, which knows how it should be presented over HTTP.
//!
//! Client mistakes map to 400 and are logged at debug level; environment and upstream
//! faults map to 500 and are logged as errors. No other statuses are produced.

use std::io;

use crate::settings::ConfigError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_UPLOAD")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, too many or too large files, or an unreadable multipart body.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Missing or malformed settings, missing required key, unknown tool/method/mode.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// `fileOrder` does not describe the uploaded files.
    #[error("File order mismatch: {0}")]
    FileOrder(String),

    /// An accepted upload part could not be read back.
    #[error("Upload read error: {0}")]
    UploadRead(String),

    #[error("Audio engine error: {0}")]
    Upstream(String),

    #[error("Audio engine timeout: {0}")]
    UpstreamTimeout(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::InvalidSettings(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::InvalidUpload(_) => (400, "INVALID_UPLOAD", LogLevel::Debug),
        AppError::InvalidSettings(_) => (400, "INVALID_SETTINGS", LogLevel::Debug),
        AppError::FileOrder(_) => (400, "FILE_ORDER_MISMATCH", LogLevel::Debug),
        AppError::UploadRead(_) => (500, "UPLOAD_READ_ERROR", LogLevel::Error),
        AppError::Upstream(_) => (500, "UPSTREAM_ERROR", LogLevel::Error),
        AppError::UpstreamTimeout(_) => (500, "UPSTREAM_TIMEOUT", LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for log records
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidUpload(_) => "InvalidUpload",
            AppError::InvalidSettings(_) => "InvalidSettings",
            AppError::FileOrder(_) => "FileOrder",
            AppError::UploadRead(_) => "UploadRead",
            AppError::Upstream(_) => "Upstream",
            AppError::UpstreamTimeout(_) => "UpstreamTimeout",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidUpload(ref msg) => msg.clone(),
            AppError::InvalidSettings(ref msg) => msg.clone(),
            AppError::FileOrder(ref msg) => msg.clone(),
            AppError::UploadRead(ref msg) => msg.clone(),
            AppError::Upstream(ref msg) => format!("audio processing failed: {}", msg),
            AppError::UpstreamTimeout(ref msg) => format!("audio processing timed out: {}", msg),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
