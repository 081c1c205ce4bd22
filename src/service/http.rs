// ABOUTME: HTTPS client for the partner hosting API using reqwest.
// ABOUTME: Streams file uploads, publishes the stage index, and reads it back from the site.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;

use super::{DeploymentService, ServiceError};
use crate::types::AppName;

pub const DEFAULT_API_URL: &str = "https://partner.decentapps.net";
pub const DEFAULT_SITE_URL: &str = "https://decentapps.net";

const REPO_OWNER_HEADER: &str = "x-repo-owner";

/// Base URLs of the partner API and the public site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_api_url")]
    pub api: String,
    #[serde(default = "default_site_url")]
    pub site: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_site_url() -> String {
    DEFAULT_SITE_URL.to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: default_api_url(),
            site: default_site_url(),
        }
    }
}

/// Partner API credentials provisioned for a repository owner.
#[derive(Clone)]
pub struct Credentials {
    pub repo_owner: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("repo_owner", &self.repo_owner)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// [`DeploymentService`] backed by the partner's HTTPS API.
pub struct HttpDeploymentService {
    http: reqwest::Client,
    endpoints: Endpoints,
    app_name: AppName,
    auth_headers: Option<HeaderMap>,
}

impl HttpDeploymentService {
    /// Client that can upload and publish.
    pub fn new(
        app_name: AppName,
        endpoints: Endpoints,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let mut service = Self::read_only(app_name, endpoints, timeout)?;
        service.auth_headers = Some(auth_headers(credentials)?);
        Ok(service)
    }

    /// Client that can only read the published stage index.
    pub fn read_only(
        app_name: AppName,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        // No total deadline: a large asset may take longer than `timeout` to
        // stream, as long as the connection keeps making progress.
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoints,
            app_name,
            auth_headers: None,
        })
    }

    fn auth(&self) -> Result<HeaderMap, ServiceError> {
        self.auth_headers
            .clone()
            .ok_or(ServiceError::MissingCredentials)
    }

    fn file_url(&self, version: &str, key: &str) -> String {
        format!(
            "{}/api/deployment/{}/{}/{}",
            self.endpoints.api.trim_end_matches('/'),
            urlencoding::encode(self.app_name.as_str()),
            urlencoding::encode(version),
            encode_key(key)
        )
    }

    fn stage_index_put_url(&self, update_route: bool) -> String {
        let url = format!(
            "{}/api/deployment/{}/index.html",
            self.endpoints.api.trim_end_matches('/'),
            urlencoding::encode(self.app_name.as_str())
        );
        if update_route {
            format!("{url}?updateRoute=true")
        } else {
            url
        }
    }
}

fn auth_headers(credentials: &Credentials) -> Result<HeaderMap, ServiceError> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.api_key))
        .map_err(|_| ServiceError::InvalidHeader("authorization"))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(
        REPO_OWNER_HEADER,
        HeaderValue::from_str(&credentials.repo_owner)
            .map_err(|_| ServiceError::InvalidHeader(REPO_OWNER_HEADER))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Percent-encode each `/`-separated segment of a remote key.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

async fn ensure_success(resp: reqwest::Response) -> Result<(), ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DeploymentService for HttpDeploymentService {
    async fn put_file(
        &self,
        version: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<(), ServiceError> {
        let read_err = |source| ServiceError::ReadFile {
            path: local_path.to_path_buf(),
            source,
        };
        let file = tokio::fs::File::open(local_path).await.map_err(read_err)?;
        let len = file.metadata().await.map_err(read_err)?.len();

        let resp = self
            .http
            .put(self.file_url(version, key))
            .headers(self.auth()?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, len)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        ensure_success(resp).await
    }

    async fn put_stage_index(
        &self,
        document: &str,
        update_route: bool,
    ) -> Result<(), ServiceError> {
        let resp = self
            .http
            .put(self.stage_index_put_url(update_route))
            .headers(self.auth()?)
            .header(CONTENT_TYPE, "text/html")
            .body(document.to_string())
            .send()
            .await?;

        ensure_success(resp).await
    }

    async fn fetch_stage_index(&self) -> Result<Option<String>, ServiceError> {
        let resp = self.http.get(self.stage_index_url()).send().await?;
        if !resp.status().is_success() {
            tracing::debug!("stage index not available: HTTP {}", resp.status());
            return Ok(None);
        }
        Ok(Some(resp.text().await?))
    }

    fn stage_index_url(&self) -> String {
        format!(
            "{}/_{}/index.html",
            self.endpoints.site.trim_end_matches('/'),
            self.app_name
        )
    }

    fn stage_url(&self, version: &str) -> String {
        format!(
            "{}/_{}/{}/",
            self.endpoints.site.trim_end_matches('/'),
            self.app_name,
            version
        )
    }
}
