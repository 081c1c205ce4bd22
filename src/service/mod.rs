// ABOUTME: Partner hosting service abstraction used by uploads and the stage index.
// ABOUTME: The HTTP client implements it; tests substitute an in-memory fake.

mod error;
mod http;

pub use error::ServiceError;
pub use http::{Credentials, Endpoints, HttpDeploymentService};

use async_trait::async_trait;
use std::path::Path;

/// Operations the deploy pipeline needs from the hosting partner.
///
/// An implementation is bound to one app. Uploads are PUTs, so repeating one
/// overwrites the earlier copy.
#[async_trait]
pub trait DeploymentService: Send + Sync {
    /// Upload one local file under `<version>/<key>`.
    async fn put_file(&self, version: &str, key: &str, local_path: &Path)
    -> Result<(), ServiceError>;

    /// Replace the app's stage index document.
    async fn put_stage_index(&self, document: &str, update_route: bool)
    -> Result<(), ServiceError>;

    /// Fetch the published stage index. `Ok(None)` means nothing is published.
    async fn fetch_stage_index(&self) -> Result<Option<String>, ServiceError>;

    /// Public URL of the stage index document.
    fn stage_index_url(&self) -> String;

    /// Public URL where a staged version is served.
    fn stage_url(&self, version: &str) -> String;
}
