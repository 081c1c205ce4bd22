// ABOUTME: Transport error types for the partner hosting service.
// ABOUTME: Covers HTTP failures, non-success statuses, and local file access.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed with status code: {status}. Response: {body}")]
    Status { status: u16, body: String },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("no partner credentials configured for this client")]
    MissingCredentials,

    #[error("upload panicked: {0}")]
    Panicked(String),
}

impl ServiceError {
    /// HTTP status code, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            ServiceError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
