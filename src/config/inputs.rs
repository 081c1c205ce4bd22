// ABOUTME: Deploy inputs resolved from the CI environment.
// ABOUTME: Validates the commit hash and app name and reports missing values by name.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::service::Credentials;
use crate::types::{AppName, CommitHash};

pub const COMMIT_SHA_VAR: &str = "GITHUB_SHA";
pub const REPO_OWNER_VAR: &str = "GITHUB_REPOSITORY_OWNER";
pub const WORKSPACE_VAR: &str = "GITHUB_WORKSPACE";
pub const CI_VAR: &str = "GITHUB_ACTIONS";

pub const API_KEY_INPUT: &str = "api-key";
pub const APP_NAME_INPUT: &str = "app-name";

/// Environment key for a named action input, e.g. `api-key` -> `INPUT_API_KEY`.
pub fn input_env_key(name: &str) -> String {
    format!("INPUT_{}", name.replace('-', "_").to_uppercase())
}

/// Whether we are running inside GitHub Actions.
pub fn running_in_ci(lookup: impl Fn(&str) -> Option<String>) -> bool {
    lookup(CI_VAR).as_deref() == Some("true")
}

/// Values given on the command line that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub app_name: Option<String>,
    pub workspace: Option<PathBuf>,
}

/// Everything a deploy needs from its caller.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub commit: CommitHash,
    pub credentials: Credentials,
    pub app_name: AppName,
    pub workspace: PathBuf,
}

impl Inputs {
    pub fn from_env(overrides: &InputOverrides) -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok(), overrides)
    }

    /// Resolve inputs through `lookup`, checking them in a fixed order so the
    /// first missing value is the one reported.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        overrides: &InputOverrides,
    ) -> Result<Self> {
        let sha = non_empty(lookup(COMMIT_SHA_VAR))
            .ok_or_else(|| Error::MissingEnvVar(COMMIT_SHA_VAR.to_string()))?;
        let commit = CommitHash::new(&sha).map_err(|source| Error::InvalidCommitHash {
            var: COMMIT_SHA_VAR.to_string(),
            source,
        })?;

        let repo_owner = non_empty(lookup(REPO_OWNER_VAR))
            .ok_or_else(|| Error::MissingEnvVar(REPO_OWNER_VAR.to_string()))?;

        let api_key = required_input(&lookup, API_KEY_INPUT)?;
        let app_name = resolve_app_name(&lookup, overrides)?;

        let workspace = match &overrides.workspace {
            Some(path) => path.clone(),
            None => non_empty(lookup(WORKSPACE_VAR))
                .map(PathBuf::from)
                .ok_or_else(|| Error::MissingEnvVar(WORKSPACE_VAR.to_string()))?,
        };

        Ok(Self {
            commit,
            credentials: Credentials {
                repo_owner,
                api_key,
            },
            app_name,
            workspace,
        })
    }

    /// The stage version for this deploy: the short commit hash.
    pub fn stage_version(&self) -> &str {
        self.commit.short()
    }
}

/// Resolve only the app name (override first, then the `app-name` input).
pub fn resolve_app_name(
    lookup: impl Fn(&str) -> Option<String>,
    overrides: &InputOverrides,
) -> Result<AppName> {
    let raw = match non_empty(overrides.app_name.clone()) {
        Some(name) => name,
        None => required_input(&lookup, APP_NAME_INPUT)?,
    };
    Ok(AppName::new(&raw)?)
}

fn required_input(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    non_empty(lookup(&input_env_key(name))).ok_or_else(|| Error::MissingInput(name.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
