use sonic_core::{AppError, GatewayConfig};

use crate::upload::payload::PayloadError;
use crate::upload::spool::UploadedFile;
use crate::upload::UploadError;

/// Upload validation errors. All of them are the client's fault.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("could not determine request size")]
    UnknownRequestSize,

    #[error("request size: {size} bytes. Max request size: {max} bytes. Reduce file size")]
    RequestTooLarge { size: u64, max: u64 },

    #[error("request body exceeds {max} bytes")]
    BodyTooLarge { max: u64 },

    #[error("failed to parse form (too large or invalid): {0}")]
    MalformedMultipart(String),

    #[error("settings field exceeds {max} bytes")]
    SettingsTooLarge { max: usize },

    #[error("settings field is not valid UTF-8")]
    SettingsNotUtf8,

    #[error("no files selected")]
    NoFiles,

    #[error("too many files: max {max}")]
    TooManyFiles { max: usize },

    #[error("total upload exceeds {max} bytes")]
    UploadTooLarge { max: u64 },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidUpload(err.to_string())
    }
}

/// Process-wide upload limits, fixed at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum number of `files` parts.
    pub max_files: usize,
    /// Ceiling on the combined size of all `files` parts.
    pub max_upload_size: u64,
    /// Ceiling on the whole request body (files plus framing, settings and cover).
    pub body_ceiling: u64,
    /// In-memory budget shared by all spooled parts of one request; the rest goes to disk.
    pub memory_buffer: usize,
    /// Ceiling on the `settings` text part.
    pub max_settings: usize,
}

impl UploadLimits {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            max_files: config.max_files,
            max_upload_size: config.max_upload_size_bytes as u64,
            body_ceiling: config.body_ceiling_bytes() as u64,
            memory_buffer: config.multipart_memory_bytes,
            max_settings: config.max_settings_bytes,
        }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

/// Reject a request before parsing when its size is unknown or above the body ceiling.
pub fn check_request_size(
    declared: Option<u64>,
    limits: &UploadLimits,
) -> Result<u64, ValidationError> {
    let size = declared.ok_or(ValidationError::UnknownRequestSize)?;
    if size > limits.body_ceiling {
        return Err(ValidationError::RequestTooLarge {
            size,
            max: limits.body_ceiling,
        });
    }
    Ok(size)
}

/// The accepted `files` parts: `1..=max_files` of them, summing to at most `max_upload_size`.
#[derive(Debug)]
pub struct ValidatedFileSet {
    files: Vec<UploadedFile>,
    total_bytes: u64,
}

impl ValidatedFileSet {
    /// Check count and combined size. A file's recorded size is trusted when non-zero;
    /// otherwise it is measured by reading the part to the end and discarding it.
    pub async fn validate(
        files: Vec<UploadedFile>,
        limits: &UploadLimits,
    ) -> Result<Self, UploadError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles.into());
        }
        if files.len() > limits.max_files {
            return Err(ValidationError::TooManyFiles {
                max: limits.max_files,
            }
            .into());
        }

        let mut total_bytes: u64 = 0;
        for file in &files {
            let size = match file.declared_size() {
                0 => file
                    .measure()
                    .await
                    .map_err(|source| PayloadError::read(file.name(), source))?,
                declared => declared,
            };
            total_bytes = total_bytes.saturating_add(size);
            if total_bytes > limits.max_upload_size {
                return Err(ValidationError::UploadTooLarge {
                    max: limits.max_upload_size,
                }
                .into());
            }
        }

        tracing::debug!(
            file_count = files.len(),
            total_bytes,
            "Upload file set validated"
        );

        Ok(Self { files, total_bytes })
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}
