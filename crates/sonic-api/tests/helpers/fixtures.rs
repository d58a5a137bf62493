//! Test fixtures: small audio-like blobs and multipart upload bodies.

use axum::body::Body;
use axum::http::{header, Request};
use axum_test::multipart::{MultipartForm, Part};

pub const BOUNDARY: &str = "sonic-test-boundary-7d1f";

/// Fake MP3 payload: an ID3 header followed by filler bytes, unique per `seed`.
pub fn fake_mp3(seed: u8, len: usize) -> Vec<u8> {
    let mut data = b"ID3\x04\x00\x00".to_vec();
    data.resize(len.max(data.len()), seed);
    data.truncate(len);
    data
}

/// Fake WAV payload of exactly `len` bytes.
pub fn fake_wav(seed: u8, len: usize) -> Vec<u8> {
    let mut data = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
    data.resize(len.max(data.len()), seed);
    data.truncate(len);
    data
}

/// Minimal JPEG marker bytes for a cover image.
pub fn fake_jpeg() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9]
}

/// A `multipart/form-data` body assembled in memory, so the request carries an exact
/// `Content-Length` the way browsers send uploads.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    body: Vec<u8>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, field: &str, filename: &str, mime_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {mime_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, field: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n")
                .as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_body(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }

    /// `POST /upload` with matching `Content-Type` and `Content-Length` headers.
    pub fn into_request(self) -> Request<Body> {
        let body = self.into_body();
        Request::post("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .expect("Failed to build upload request")
    }
}

/// One `files` part per `(name, data)` and an optional `settings` part.
pub fn upload_form(files: &[(&str, Vec<u8>)], settings: Option<&str>) -> UploadForm {
    let mut form = UploadForm::new();
    for (name, data) in files {
        form = form.file("files", name, "audio/mpeg", data);
    }
    if let Some(settings) = settings {
        form = form.text("settings", settings);
    }
    form
}

/// The same form built with axum-test, which streams it without a declared length.
pub fn streamed_upload_form(files: &[(&str, Vec<u8>)], settings: Option<&str>) -> MultipartForm {
    let mut form = MultipartForm::new();
    for (name, data) in files {
        form = form.add_part(
            "files",
            Part::bytes(data.clone())
                .file_name(name.to_string())
                .mime_type("audio/mpeg"),
        );
    }
    if let Some(settings) = settings {
        form = form.add_text("settings", settings.to_string());
    }
    form
}
