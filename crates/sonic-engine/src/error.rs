use std::time::Duration;

use sonic_core::AppError;

/// Failure of a remote audio engine call. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid audio engine address {addr:?}: {message}")]
    InvalidAddress { addr: String, message: String },

    #[error("audio engine unavailable: {0}")]
    Unavailable(String),

    /// The engine answered with a non-OK status; `message` is the engine's own text.
    #[error("{message} ({code:?})")]
    Rpc { code: tonic::Code, message: String },

    #[error("no response within {}s", .0.as_secs())]
    Timeout(Duration),
}

impl From<tonic::Status> for EngineError {
    fn from(status: tonic::Status) -> Self {
        let message = if status.message().is_empty() {
            status.code().description().to_string()
        } else {
            status.message().to_string()
        };
        EngineError::Rpc {
            code: status.code(),
            message,
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Timeout(_) => AppError::UpstreamTimeout(err.to_string()),
            _ => AppError::Upstream(err.to_string()),
        }
    }
}
