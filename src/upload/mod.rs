//! Inline image upload bridge between the rich-text editor and the backend.
//!
//! The editor widget hands over a binary payload plus filename and a progress
//! callback; the bridge answers with the canonical URL of the stored image.
//! Each call is one multipart POST with no retry and no shared state, so the
//! widget may run several uploads concurrently (pasting multiple images).

use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

/// Multipart field name the backend expects the blob under.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Chunk size for the streamed request body; each yielded chunk drives one
/// progress tick.
const PROGRESS_CHUNK_BYTES: usize = 64 * 1024;

pub type UploadResult<T> = std::result::Result<T, UploadError>;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image payload is empty")]
    EmptyPayload,
    #[error("image filename is empty")]
    MissingFilename,
    #[error("could not obtain the image URL from the upload response")]
    MissingImageUrl,
    #[error("image upload failed: {0}")]
    Request(String),
}

impl UploadError {
    /// The widget contract expects a plain string rejection reason.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Validated upload input: a non-empty payload and filename.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    bytes: Bytes,
    filename: String,
}

impl UploadRequest {
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>) -> UploadResult<Self> {
        let bytes = bytes.into();
        let filename = filename.into();
        if bytes.is_empty() {
            return Err(UploadError::EmptyPayload);
        }
        if filename.trim().is_empty() {
            return Err(UploadError::MissingFilename);
        }
        Ok(Self { bytes, filename })
    }

    pub fn total_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    src: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct ImageUploadBridge {
    client: reqwest::Client,
    endpoint: String,
}

impl ImageUploadBridge {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Uploads one image and resolves with its canonical URL.
    ///
    /// `on_progress` receives the running completion percentage as the body
    /// streams out, monotonically non-decreasing and ending at 100. The total
    /// is always known here since the payload is in memory.
    pub async fn upload<P>(&self, request: UploadRequest, mut on_progress: P) -> UploadResult<String>
    where
        P: FnMut(f64) + Send + 'static,
    {
        let total = request.total_bytes();
        let filename = request.filename.clone();
        tracing::debug!(total, filename = %filename, "starting image upload");

        let mut sent = 0usize;
        let body_stream =
            futures::stream::iter(split_chunks(&request.bytes, PROGRESS_CHUNK_BYTES)).map(
                move |chunk| {
                    sent += chunk.len();
                    on_progress(percent_complete(sent, total));
                    Ok::<Bytes, std::io::Error>(chunk)
                },
            );

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(body_stream), total as u64)
            .file_name(filename);
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| UploadError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(server_error(status.as_u16(), &body));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|err| UploadError::Request(err.to_string()))?;
        extract_image_url(parsed)
    }

    /// Widget-facing wrapper: resolves with the URL or rejects with a plain
    /// string reason, matching the editor's upload handler contract.
    pub async fn upload_for_editor<P>(
        &self,
        request: UploadRequest,
        on_progress: P,
    ) -> std::result::Result<String, String>
    where
        P: FnMut(f64) + Send + 'static,
    {
        self.upload(request, on_progress)
            .await
            .map_err(|err| err.reason())
    }
}

fn split_chunks(bytes: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(bytes.len().div_ceil(chunk_size));
    let mut start = 0;
    while start < bytes.len() {
        let end = usize::min(start + chunk_size, bytes.len());
        chunks.push(bytes.slice(start..end));
        start = end;
    }
    chunks
}

fn percent_complete(sent: usize, total: usize) -> f64 {
    sent as f64 / total as f64 * 100.0
}

fn extract_image_url(response: UploadResponse) -> UploadResult<String> {
    response
        .src
        .filter(|src| !src.is_empty())
        .ok_or(UploadError::MissingImageUrl)
}

/// Composes the rejection for a non-success response: the server-provided
/// message when the body carries one, otherwise the status line.
fn server_error(status: u16, body: &str) -> UploadError {
    let server_message = serde_json::from_str::<ServerErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message);
    match server_message {
        Some(message) => UploadError::Request(message),
        None => UploadError::Request(format!("server returned HTTP {status}")),
    }
}
