// ABOUTME: Deploy command implementation.
// ABOUTME: Resolves inputs and config, builds the partner client, and runs the deploy pipeline.

use stagepush::config::{Config, InputOverrides, Inputs};
use stagepush::deploy::{self, DeployRequest};
use stagepush::diagnostics::Diagnostics;
use stagepush::error::Result;
use stagepush::output::Output;
use stagepush::service::{DeploymentService, HttpDeploymentService};
use std::env;
use std::sync::Arc;

/// Deploy the workspace's dist directory as the stage version for this commit.
pub async fn deploy(
    overrides: &InputOverrides,
    update_route: bool,
    output: &Output,
) -> Result<()> {
    let group = output.group("Collecting inputs");
    let cwd = env::current_dir()?;
    let config = Config::discover(&cwd)?;
    let inputs = Inputs::from_env(overrides)?;
    tracing::debug!(?inputs, "resolved inputs");
    drop(group);

    let service: Arc<dyn DeploymentService> = Arc::new(HttpDeploymentService::new(
        inputs.app_name.clone(),
        config.endpoints.clone(),
        &inputs.credentials,
        config.upload.request_timeout,
    )?);

    let request = DeployRequest {
        app_name: inputs.app_name.clone(),
        stage_version: inputs.stage_version().to_string(),
        dist_dir: config.dist_path(&inputs.workspace),
        upload: config.upload,
        update_route: update_route || config.stage_index.update_route,
    };

    let mut diag = Diagnostics::default();
    let result = deploy::deploy(service, &request, output, &mut diag).await;

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let report = result?;
    output.success(&report.summary());
    Ok(())
}
