//! Collaborator contracts consumed by the editor controller.
//!
//! The storage backend, related-entity lookup, alerting surface, and
//! navigation are external concerns; the controller only sees these traits
//! and receives implementations through its constructor.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{RecordDraft, RecordId, RelatedOption};

pub type RequestResult<T> = std::result::Result<T, RequestError>;

/// HTTP-shaped failure from any collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct RequestError {
    /// HTTP status when the server answered; `None` for transport failures.
    pub status: Option<u16>,
    /// Message body provided by the server, when present.
    pub server_message: Option<String>,
    /// Generic description of what went wrong.
    pub detail: String,
}

impl RequestError {
    pub fn from_status(status: u16, server_message: Option<String>) -> Self {
        Self {
            status: Some(status),
            server_message,
            detail: format!("server returned HTTP {status}"),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            server_message: None,
            detail: detail.into(),
        }
    }

    /// User-facing message: the server-provided detail when present,
    /// otherwise the generic one.
    pub fn message(&self) -> String {
        match (&self.server_message, self.status) {
            (Some(msg), Some(status)) => format!("HTTP {status}: {msg}"),
            (Some(msg), None) => msg.clone(),
            (None, Some(status)) => format!("HTTP {status}: {}", self.detail),
            (None, None) => self.detail.clone(),
        }
    }
}

/// Record persistence: find/create/update against the remote API.
#[async_trait]
pub trait RecordStore {
    async fn find(&self, id: RecordId) -> RequestResult<RecordDraft>;
    /// Persists a new record; the response carries the assigned id.
    async fn create(&self, draft: &RecordDraft) -> RequestResult<RecordDraft>;
    async fn update(&self, draft: &RecordDraft) -> RequestResult<RecordDraft>;
}

/// Lookup for the related-entity list backing the selection control.
#[async_trait]
pub trait RelatedSource {
    async fn retrieve(&self) -> RequestResult<Vec<RelatedOption>>;
}

/// User-visible notification surface. Fire-and-forget.
pub trait AlertSink {
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn http_error(&self, error: &RequestError);
}

/// Navigation side effect, triggered after a successful save.
pub trait Navigator {
    fn go_back(&self);
}
