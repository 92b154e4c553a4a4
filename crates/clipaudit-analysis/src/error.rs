use std::path::PathBuf;

use clipaudit_media::MediaError;
use thiserror::Error;

use crate::types::ClassificationKind;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("audio conversion failed: {0}")]
    Conversion(#[from] MediaError),

    #[error("cannot read audio {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("speech endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed speech response: {0}")]
    Malformed(String),

    #[error("no speech recognized")]
    Empty,
}

/// Failure of a single classifier call, before it is attributed to a kind.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

// URLs are stripped so query-string credentials never reach logs or reports.
impl From<reqwest::Error> for TranscriptionError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Result-level classification failure.
///
/// Never fatal to a job: the aggregator counts it and moves on.
#[derive(Debug, Clone, Error)]
#[error("{kind} classification via {provider} failed: {message}")]
pub struct ClassificationError {
    pub kind: ClassificationKind,
    pub provider: &'static str,
    pub message: String,
}

/// Read an error response body, truncated for logs and error messages.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    const MAX_BODY: usize = 512;
    let body = response.text().await.unwrap_or_default();
    if body.len() <= MAX_BODY {
        return body;
    }
    let mut end = MAX_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
