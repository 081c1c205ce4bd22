// ABOUTME: Status command implementation.
// ABOUTME: Reads the published stage index and prints the recorded versions.

use stagepush::config::{Config, InputOverrides, resolve_app_name};
use stagepush::diagnostics::Diagnostics;
use stagepush::error::Result;
use stagepush::output::{Output, OutputMode};
use stagepush::service::{DeploymentService, HttpDeploymentService};
use stagepush::stage_index::find_app_versions;
use std::env;

/// Show the stage, production, and rollback versions for an app.
pub async fn status(overrides: &InputOverrides, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let config = Config::discover(&cwd)?;
    let app_name = resolve_app_name(|key| env::var(key).ok(), overrides)?;

    let service = HttpDeploymentService::read_only(
        app_name.clone(),
        config.endpoints.clone(),
        config.upload.request_timeout,
    )?;

    let mut diag = Diagnostics::default();
    let versions = find_app_versions(&service, &mut diag).await;
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    if output.mode() == OutputMode::Json {
        println!("{}", serde_json::to_string(&versions).map_err(std::io::Error::other)?);
        return Ok(());
    }

    if versions.is_empty() {
        output.success(&format!(
            "No stage index published for {app_name} at {}.",
            service.stage_index_url()
        ));
        return Ok(());
    }

    println!("App:        {app_name}");
    println!("Stage:      {}", or_none(&versions.stage_version));
    println!("Production: {}", or_none(&versions.production_version));
    println!("Rollback:   {}", or_none(&versions.rollback_version));
    Ok(())
}

fn or_none(version: &str) -> &str {
    if version.is_empty() { "(none)" } else { version }
}
