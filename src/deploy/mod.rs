// ABOUTME: The deploy pipeline: prepare dist, upload every file, then republish the stage index.
// ABOUTME: Steps run strictly in order; the stage index is only touched after uploads settle.

use nonempty::NonEmpty;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::diagnostics::{Diagnostics, Warning};
use crate::dist;
use crate::error::{Error, Result};
use crate::output::Output;
use crate::service::DeploymentService;
use crate::stage_index::{self, AppVersions};
use crate::types::AppName;
use crate::upload::{self, UploadSettings, UploadSlots};

/// What to deploy and how.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub app_name: AppName,
    pub stage_version: String,
    pub dist_dir: PathBuf,
    pub upload: UploadSettings,
    pub update_route: bool,
}

/// Result of a successful deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    pub uploaded: usize,
    pub stage_url: String,
    pub versions: AppVersions,
}

impl DeployReport {
    pub fn summary(&self) -> String {
        format!(
            "Successfully deployed {} files to {}.",
            self.uploaded, self.stage_url
        )
    }
}

/// Run one deploy against `service`.
///
/// Warnings for absorbed failures land in `diag`; any hard failure is returned
/// as an error and leaves the stage index untouched unless the failure is the
/// publish itself.
pub async fn deploy(
    service: Arc<dyn DeploymentService>,
    request: &DeployRequest,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<DeployReport> {
    let group = output.group("Preparing local dist path and version file");
    dist::ensure_dist_dir(&request.dist_dir).await?;
    dist::write_version_file(&request.dist_dir, &request.stage_version).await?;
    drop(group);

    let group = output.group("Preparing files for upload");
    let files = dist::find_files(&request.dist_dir).await?;
    if dist::only_version_file(&files) {
        diag.warn(Warning::dist_only_version_file(format!(
            "No files found in ./dist directory besides {}. Is your project building to ./dist?",
            dist::VERSION_FILENAME
        )));
    }
    // version.txt was just written, so the list is never empty in practice.
    let files =
        NonEmpty::from_vec(files).ok_or_else(|| Error::DistMissing(request.dist_dir.clone()))?;
    let mut slots = UploadSlots::new(&request.dist_dir, files)?;
    drop(group);

    let group = output.group(&format!("Uploading {} files", slots.total()));
    let report = upload::upload_all(
        Arc::clone(&service),
        &request.stage_version,
        &mut slots,
        &request.upload,
        diag,
    )
    .await;
    drop(group);
    let report = report.into_result()?;

    let group = output.group("Updating stage index");
    let prior = stage_index::find_app_versions(service.as_ref(), diag).await;
    output.progress(&format!(
        "uploading new stage index - stage version={}, production version={}, rollback version={}",
        request.stage_version, prior.production_version, prior.rollback_version
    ));
    let versions = stage_index::publish_stage_index(
        service.as_ref(),
        &request.app_name,
        &request.stage_version,
        &prior,
        request.update_route,
    )
    .await
    .map_err(Error::StageIndexPublish)?;
    drop(group);

    Ok(DeployReport {
        uploaded: report.uploaded,
        stage_url: service.stage_url(&request.stage_version),
        versions,
    })
}
