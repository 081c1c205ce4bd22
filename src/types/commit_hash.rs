// ABOUTME: Commit hash validation for stage versions.
// ABOUTME: Accepts 7 or 40 hex digits and exposes the short form used in URLs.

use std::fmt;
use thiserror::Error;

const SHORT_LEN: usize = 7;
const LONG_LEN: usize = 40;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitHashError {
    #[error("commit hash must be 7 or 40 characters, got {0}")]
    InvalidLength(usize),

    #[error("invalid character in commit hash: '{0}'")]
    InvalidChar(char),
}

/// A validated git commit hash, kept in the case it was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn new(value: &str) -> Result<Self, CommitHashError> {
        if value.len() != SHORT_LEN && value.len() != LONG_LEN {
            return Err(CommitHashError::InvalidLength(value.len()));
        }

        if let Some(c) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(CommitHashError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 7-character form used as the stage version.
    pub fn short(&self) -> &str {
        &self.0[..SHORT_LEN]
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
