use std::sync::Arc;

use axum::{
    body::HttpBody,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use sonic_core::{AppError, AudioResult};
use sonic_processing::{check_request_size, ValidationError};

use crate::error::HttpAppError;
use crate::middleware::RequestId;
use crate::services::dispatch::ToolDispatcher;
use crate::state::AppState;
use crate::utils::upload::{content_disposition, extract_upload};

/// `Content-Length` when present, otherwise the body's exact size if it is known.
fn declared_length(request: &Request) -> Option<u64> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .or_else(|| request.body().size_hint().exact())
}

fn request_id(request: &Request) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

fn audio_response(result: AudioResult) -> Response {
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&result.filename),
            ),
        ],
        result.data,
    )
        .into_response()
}

/// `POST /upload`: validate the multipart request, run one tool on the remote engine and
/// return the processed file as an attachment.
#[tracing::instrument(
    skip(state, request),
    fields(request_id = %request_id(&request), operation = "upload")
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, HttpAppError> {
    let request_bytes = check_request_size(declared_length(&request), &state.limits)?;
    tracing::debug!(request_bytes, "Upload request received");

    let multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| ValidationError::MalformedMultipart(rejection.body_text()))?;
    let upload = extract_upload(multipart, &state.limits).await?;

    let result = ToolDispatcher::new(state.engine.as_ref(), &state.limits)
        .run(upload)
        .await
        .map_err(AppError::from)?;

    Ok(audio_response(result))
}
