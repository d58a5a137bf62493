//! Upload pipeline pieces: spooling parts, ordering them, reading them back.

pub mod order;
pub mod payload;
pub mod spool;

use sonic_core::AppError;

use crate::validator::ValidationError;
use payload::PayloadError;

/// Failure while accepting upload parts: either bad input or an environment fault.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Validation(e) => e.into(),
            UploadError::Payload(e) => e.into(),
        }
    }
}
