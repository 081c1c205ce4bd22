// ABOUTME: Application-wide error types for stagepush.
// ABOUTME: Uses thiserror and separates operator-facing errors from internal ones.

use std::path::PathBuf;
use thiserror::Error;

use crate::service::ServiceError;
use crate::types::{AppNameError, CommitHashError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Input {0} is required.")]
    MissingInput(String),

    #[error("{0} environment variable is not set.")]
    MissingEnvVar(String),

    #[error("{var} environment variable is invalid: {source}")]
    InvalidCommitHash {
        var: String,
        #[source]
        source: CommitHashError,
    },

    #[error("invalid app name: {0}")]
    InvalidAppName(#[from] AppNameError),

    #[error(
        "Local dist directory missing at {0}. Your workflow should check out your project and build/copy to the ./dist folder all files meant for deployment."
    )]
    DistMissing(PathBuf),

    #[error("{path} is not inside the dist directory {root}")]
    FileOutsideDist { path: PathBuf, root: PathBuf },

    #[error("Failed to upload any files. See previous warnings for details.")]
    NoFilesUploaded,

    #[error(
        "Failed to upload all files. Only {uploaded} of {total} files were uploaded successfully. See previous warnings for details."
    )]
    PartialUpload { uploaded: usize, total: usize },

    #[error("Failed to publish stage index: {0}")]
    StageIndexPublish(#[source] ServiceError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("partner service error: {0}")]
    Service(#[from] ServiceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether the message is meant for the operator as-is.
    ///
    /// Other errors may carry internal details and are replaced by a generic
    /// notice when running in CI.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Error::MissingInput(_)
                | Error::MissingEnvVar(_)
                | Error::InvalidCommitHash { .. }
                | Error::InvalidAppName(_)
                | Error::DistMissing(_)
                | Error::NoFilesUploaded
                | Error::PartialUpload { .. }
                | Error::InvalidConfig(_)
                | Error::Yaml(_)
        )
    }

    /// Message to show the operator.
    pub fn display_message(&self, in_ci: bool) -> String {
        if in_ci && !self.is_expected() {
            UNEXPECTED_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

pub type Result<T> = std::result::Result<T, Error>;
