// ABOUTME: Stage index protocol: a versioned HTML pointer to an app's current versions.
// ABOUTME: Serializes and parses the document, and reads/publishes it through the service.

mod error;
mod format;

pub use error::StageIndexError;
pub use format::{FORMAT_MARKER, FormatVersion, read_format_tag};

use serde::Serialize;
use snafu::OptionExt;

use crate::diagnostics::{Diagnostics, Warning};
use crate::service::{DeploymentService, ServiceError};
use crate::types::AppName;
use error::{MissingFormatTagSnafu, UnsupportedFormatSnafu};

/// Versions recorded in a stage index. All empty means nothing was published yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppVersions {
    pub stage_version: String,
    pub production_version: String,
    pub rollback_version: String,
}

impl AppVersions {
    /// Parse a document, degrading anything unreadable to the empty state.
    pub fn from_document(document: &str) -> Self {
        parse_stage_index(document).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.stage_version.is_empty()
            && self.production_version.is_empty()
            && self.rollback_version.is_empty()
    }
}

/// Render the stage index document for `app_name`.
///
/// Values are embedded between single quotes and are not escaped.
pub fn create_stage_index(
    app_name: &AppName,
    stage_version: &str,
    production_version: &str,
    rollback_version: &str,
) -> String {
    let redirect = format!("/_{app_name}/{stage_version}/");
    format!(
        "<!DOCTYPE html><html><head><title>Stage Index for {app_name}</title><script>\n\
         {FORMAT_MARKER}{tag} Stage Index. Hand-edit at your own risk! -->\n\
         const productionVersion='{production_version}';\n\
         const rollbackVersion='{rollback_version}';\n\
         const stageVersion='{stage_version}';\n\
         window.location.href='{redirect}';\n\
         </script></head><body></body></html>",
        tag = FormatVersion::CURRENT.tag(),
    )
}

/// Parse a stage index, rejecting documents without a supported format tag.
pub fn parse_stage_index(document: &str) -> Result<AppVersions, StageIndexError> {
    let tag = read_format_tag(document).context(MissingFormatTagSnafu)?;
    let format = FormatVersion::from_tag(tag).context(UnsupportedFormatSnafu { version: tag })?;
    Ok(format.parser()(document))
}

/// Read the versions currently published for the service's app.
///
/// Never fails: a missing document is a silent first publish, and an
/// unreadable one or a transport error is recorded as a warning.
pub async fn find_app_versions(
    service: &dyn DeploymentService,
    diag: &mut Diagnostics,
) -> AppVersions {
    let url = service.stage_index_url();
    let document = match service.fetch_stage_index().await {
        Ok(Some(document)) => document,
        Ok(None) => return AppVersions::default(),
        Err(e) => {
            diag.warn(Warning::stage_index_unreadable(format!(
                "Could not retrieve app versions from existing stage index at {url}: {e}."
            )));
            return AppVersions::default();
        }
    };

    match parse_stage_index(&document) {
        Ok(versions) => versions,
        Err(e) => {
            diag.warn(Warning::stage_index_unreadable(format!(
                "Could not retrieve app versions from existing stage index at {url}: {e}."
            )));
            AppVersions::default()
        }
    }
}

/// Publish a stage index pointing at `stage_version`, carrying the prior
/// production and rollback versions forward unchanged.
pub async fn publish_stage_index(
    service: &dyn DeploymentService,
    app_name: &AppName,
    stage_version: &str,
    prior: &AppVersions,
    update_route: bool,
) -> Result<AppVersions, ServiceError> {
    let next = AppVersions {
        stage_version: stage_version.to_string(),
        production_version: prior.production_version.clone(),
        rollback_version: prior.rollback_version.clone(),
    };
    let document = create_stage_index(
        app_name,
        &next.stage_version,
        &next.production_version,
        &next.rollback_version,
    );
    service.put_stage_index(&document, update_route).await?;
    Ok(next)
}
