// ABOUTME: Configuration types and parsing for stagepush.yml.
// ABOUTME: Holds endpoints and upload tuning; inputs come from the CI environment.

mod inputs;

pub use inputs::{
    API_KEY_INPUT, APP_NAME_INPUT, COMMIT_SHA_VAR, InputOverrides, Inputs, REPO_OWNER_VAR,
    WORKSPACE_VAR, input_env_key, resolve_app_name, running_in_ci,
};

use crate::error::{Error, Result};
use crate::service::Endpoints;
use crate::upload::UploadSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "stagepush.yml";
pub const CONFIG_FILENAME_ALT: &str = "stagepush.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".stagepush/config.yml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub upload: UploadSettings,

    #[serde(default)]
    pub stage_index: StageIndexConfig,

    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StageIndexConfig {
    /// Ask the partner to update the app's route when publishing.
    #[serde(default)]
    pub update_route: bool,
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoints: Endpoints::default(),
            upload: UploadSettings::default(),
            stage_index: StageIndexConfig::default(),
            dist_dir: default_dist_dir(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `dir`, or defaults if there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Ok(Config::default())
    }

    /// Dist directory for a workspace. Absolute `dist_dir` values win.
    pub fn dist_path(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.dist_dir)
    }

    fn validate(&self) -> Result<()> {
        for (name, url) in [("api", &self.endpoints.api), ("site", &self.endpoints.site)] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(Error::InvalidConfig(format!(
                    "endpoints.{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }
}
