// ABOUTME: Validated domain types for deploy inputs.
// ABOUTME: Commit hashes and app names are checked once at the boundary.

mod app_name;
mod commit_hash;

pub use app_name::{AppName, AppNameError};
pub use commit_hash::{CommitHash, CommitHashError};
