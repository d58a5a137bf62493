//! Multipart extraction and response helpers for the upload route

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::HeaderValue;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sonic_processing::{PartSpooler, UploadError, UploadLimits, UploadedFile, ValidationError};

pub const FILES_FIELD: &str = "files";
pub const SETTINGS_FIELD: &str = "settings";
pub const COVER_FIELD: &str = "cover";

/// Everything one upload request carried, with file parts spooled but not yet validated.
#[derive(Debug, Default)]
pub struct RawUpload {
    pub files: Vec<UploadedFile>,
    pub cover: Option<UploadedFile>,
    pub settings: Option<String>,
}

fn malformed(err: MultipartError) -> UploadError {
    ValidationError::MalformedMultipart(err.body_text()).into()
}

/// Walk the multipart body once, spooling `files` and `cover` parts and reading the
/// `settings` text. The first `settings` and `cover` parts win; later duplicates and
/// unknown fields are drained but still count against the body ceiling.
pub async fn extract_upload(
    mut multipart: Multipart,
    limits: &UploadLimits,
) -> Result<RawUpload, UploadError> {
    let mut spooler = PartSpooler::new(*limits);
    let mut upload = RawUpload::default();

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            FILES_FIELD => {
                if upload.files.len() >= limits.max_files {
                    return Err(ValidationError::TooManyFiles {
                        max: limits.max_files,
                    }
                    .into());
                }
                let filename = field.file_name().unwrap_or_default().to_string();
                let file = spool_field(&mut spooler, &mut field, filename).await?;
                upload.files.push(file);
            }
            COVER_FIELD if upload.cover.is_none() => {
                let filename = field.file_name().unwrap_or(COVER_FIELD).to_string();
                upload.cover = Some(spool_field(&mut spooler, &mut field, filename).await?);
            }
            SETTINGS_FIELD if upload.settings.is_none() => {
                upload.settings =
                    Some(read_settings(&mut spooler, &mut field, limits.max_settings).await?);
            }
            _ => {
                tracing::debug!(field = %field_name, "Skipping multipart field");
                drain(&mut spooler, &mut field).await?;
            }
        }
    }

    tracing::debug!(
        file_count = upload.files.len(),
        has_cover = upload.cover.is_some(),
        has_settings = upload.settings.is_some(),
        body_bytes = spooler.body_bytes(),
        "Multipart body read"
    );
    Ok(upload)
}

async fn spool_field(
    spooler: &mut PartSpooler,
    field: &mut Field<'_>,
    filename: String,
) -> Result<UploadedFile, UploadError> {
    let mut part = spooler.begin(filename);
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        spooler.write(&mut part, &chunk).await?;
    }
    spooler.finish(part).await
}

async fn read_settings(
    spooler: &mut PartSpooler,
    field: &mut Field<'_>,
    max: usize,
) -> Result<String, UploadError> {
    let mut raw = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        spooler.account(chunk.len())?;
        if raw.len() + chunk.len() > max {
            return Err(ValidationError::SettingsTooLarge { max }.into());
        }
        raw.extend_from_slice(&chunk);
    }
    String::from_utf8(raw).map_err(|_| ValidationError::SettingsNotUtf8.into())
}

async fn drain(spooler: &mut PartSpooler, field: &mut Field<'_>) -> Result<(), UploadError> {
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        spooler.account(chunk.len())?;
    }
    Ok(())
}

/// Replace characters that could break out of a quoted header parameter.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "output".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `attachment; filename="<name>"`, plus an RFC 5987 `filename*` when the name is not ASCII.
pub fn content_disposition(name: &str) -> HeaderValue {
    let name = sanitize_filename(name);
    let value = if name.is_ascii() {
        format!("attachment; filename=\"{}\"", name)
    } else {
        let fallback: String = name
            .chars()
            .map(|c| if c.is_ascii() { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(&name, NON_ALPHANUMERIC)
        )
    };
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
