//! Director API client
//!
//! Talks to a BOSH-style director over HTTP:
//! - `POST /deployments/{name}/diff` computes the manifest diff
//! - `POST /deployments` applies a manifest (returns a task)
//! - `GET /releases` / `POST /releases` list and fetch releases
//! - `GET /tasks/{id}` follows long-running work to completion
//!
//! Mutating calls answer with a redirect to the task they started, which
//! reqwest follows, so their final response body is the task itself.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DirectorConfig;
use crate::domain::{
    ChangeMarker, DiffLine, RecordStore, ReleaseUploader, SkipDrain, UploadOutcome,
    UploadRequest,
};
use crate::error::DirectorError;

const YAML_CONTENT_TYPE: &str = "text/yaml";

enum DirectorAuth {
    None,
    Token(String),
    Basic { username: String, password: String },
}

/// Director API client
pub struct DirectorClient {
    client: Client,
    base_url: String,
    auth: DirectorAuth,
    task_poll_interval: Duration,
}

/// A director task
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: u64,
    pub state: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Succeeded,
    Failed,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        match self.state.as_str() {
            "done" => TaskStatus::Succeeded,
            "error" | "cancelled" | "timeout" => TaskStatus::Failed,
            _ => TaskStatus::Running,
        }
    }
}

/// Response body of the diff endpoint
#[derive(Debug, Deserialize)]
struct DiffResponse {
    #[serde(default)]
    diff: Vec<(String, Option<String>)>,
}

impl DiffResponse {
    fn into_lines(self) -> Vec<DiffLine> {
        self.diff
            .into_iter()
            .map(|(text, marker)| {
                DiffLine::new(text, ChangeMarker::from_marker(marker.as_deref()))
            })
            .collect()
    }
}

/// A release known to the director
#[derive(Debug, Clone, Deserialize)]
pub struct DirectorRelease {
    pub name: String,
    #[serde(default)]
    pub release_versions: Vec<DirectorReleaseVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectorReleaseVersion {
    pub version: String,
}

/// Request to fetch a remote release
#[derive(Debug, Clone, Serialize)]
struct UploadReleaseRequest<'a> {
    location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha1: Option<&'a str>,
}

/// Path and query for the update call
pub fn update_path(recreate: bool, skip_drain: &SkipDrain) -> String {
    let mut params = Vec::new();
    if recreate {
        params.push("recreate=true".to_string());
    }
    if let Some(value) = skip_drain.query_value() {
        params.push(format!("skip_drain={}", urlencoding::encode(&value)));
    }

    if params.is_empty() {
        "/deployments".to_string()
    } else {
        format!("/deployments?{}", params.join("&"))
    }
}

impl DirectorClient {
    /// Create a client from configuration
    pub fn from_config(config: &DirectorConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let client = Client::builder()
            .timeout(config.request_timeout()?)
            .connect_timeout(config.connect_timeout()?)
            .build()
            .context("Failed to build director HTTP client")?;

        let auth = match (&config.token, &config.username, &config.password) {
            (Some(token), _, _) => DirectorAuth::Token(token.clone()),
            (None, Some(username), Some(password)) => DirectorAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            _ => DirectorAuth::None,
        };

        Ok(Self {
            client,
            base_url,
            auth,
            task_poll_interval: config.task_poll_interval()?,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.auth {
            DirectorAuth::None => builder,
            DirectorAuth::Token(token) => builder.bearer_auth(token),
            DirectorAuth::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, DirectorError> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectorError::Status { status, body });
        }

        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, DirectorError> {
        response.json().await.map_err(|e| DirectorError::Decode {
            message: e.to_string(),
        })
    }

    /// Diff `manifest` against the live deployment
    pub async fn diff(
        &self,
        deployment: &str,
        manifest: &[u8],
    ) -> Result<Vec<DiffLine>, DirectorError> {
        let path = format!("/deployments/{}/diff", urlencoding::encode(deployment));
        let response = self
            .send(
                self.request(Method::POST, &path)
                    .header(header::CONTENT_TYPE, YAML_CONTENT_TYPE)
                    .body(manifest.to_vec()),
            )
            .await?;

        let body: DiffResponse = Self::decode(response).await?;
        Ok(body.into_lines())
    }

    /// Apply `manifest` and wait for the resulting task
    pub async fn update_deployment(
        &self,
        manifest: &[u8],
        recreate: bool,
        skip_drain: &SkipDrain,
    ) -> Result<Task, DirectorError> {
        let response = self
            .send(
                self.request(Method::POST, &update_path(recreate, skip_drain))
                    .header(header::CONTENT_TYPE, YAML_CONTENT_TYPE)
                    .body(manifest.to_vec()),
            )
            .await?;

        let task: Task = Self::decode(response).await?;
        self.wait_for_task(task).await
    }

    /// List releases known to the director
    pub async fn releases(&self) -> Result<Vec<DirectorRelease>, DirectorError> {
        let response = self.send(self.request(Method::GET, "/releases")).await?;
        Self::decode(response).await
    }

    /// Whether the director already has `name` at `version`
    pub async fn has_release(&self, name: &str, version: &str) -> Result<bool, DirectorError> {
        let releases = self.releases().await?;
        Ok(releases
            .iter()
            .filter(|release| release.name == name)
            .flat_map(|release| &release.release_versions)
            .any(|v| v.version == version))
    }

    /// Ask the director to fetch a release from `url`
    pub async fn upload_remote_release(
        &self,
        url: &str,
        sha1: Option<&str>,
    ) -> Result<Task, DirectorError> {
        let body = UploadReleaseRequest {
            location: url,
            sha1,
        };
        let response = self
            .send(self.request(Method::POST, "/releases").json(&body))
            .await?;

        let task: Task = Self::decode(response).await?;
        self.wait_for_task(task).await
    }

    /// Get a task's current state
    pub async fn task(&self, id: u64) -> Result<Task, DirectorError> {
        let response = self
            .send(self.request(Method::GET, &format!("/tasks/{}", id)))
            .await?;
        Self::decode(response).await
    }

    /// Poll until the task finishes
    pub async fn wait_for_task(&self, mut task: Task) -> Result<Task, DirectorError> {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Task {}: {}", task.id, task.description));
        pb.enable_steady_tick(Duration::from_millis(100));

        loop {
            match task.status() {
                TaskStatus::Succeeded => {
                    pb.finish_and_clear();
                    info!(task = task.id, "Task done");
                    return Ok(task);
                }
                TaskStatus::Failed => {
                    pb.finish_and_clear();
                    return Err(DirectorError::TaskFailed {
                        id: task.id,
                        state: task.state,
                        result: task.result.unwrap_or_default(),
                    });
                }
                TaskStatus::Running => {
                    debug!(task = task.id, state = %task.state, "Waiting for task");
                    tokio::time::sleep(self.task_poll_interval).await;
                    task = self.task(task.id).await?;
                }
            }
        }
    }
}

/// One named deployment on the director
pub struct DirectorDeployment {
    client: Arc<DirectorClient>,
    name: String,
}

impl DirectorDeployment {
    pub fn new(client: Arc<DirectorClient>, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }
}

#[async_trait]
impl RecordStore for DirectorDeployment {
    fn name(&self) -> &str {
        &self.name
    }

    async fn diff(&self, manifest: &[u8]) -> Result<Vec<DiffLine>> {
        Ok(self.client.diff(&self.name, manifest).await?)
    }

    async fn update(&self, manifest: &[u8], recreate: bool, skip_drain: &SkipDrain) -> Result<()> {
        self.client
            .update_deployment(manifest, recreate, skip_drain)
            .await?;
        Ok(())
    }
}

/// Uploads remote releases the director does not have yet
pub struct DirectorReleaseUploader {
    client: Arc<DirectorClient>,
}

impl DirectorReleaseUploader {
    pub fn new(client: Arc<DirectorClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReleaseUploader for DirectorReleaseUploader {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadOutcome> {
        let version = request.version.to_string();
        if self.client.has_release(&request.name, &version).await? {
            info!(
                release = %request.name,
                version = %version,
                "Release already uploaded, skipping"
            );
            return Ok(UploadOutcome::AlreadyPresent);
        }

        debug!(
            release = %request.name,
            base = request.version.base(),
            qualifier = request.version.qualifier().unwrap_or("-"),
            "Asking director to fetch release"
        );
        let task = self
            .client
            .upload_remote_release(&request.url, request.sha1.as_deref())
            .await
            .with_context(|| format!("Uploading release from {}", request.url))?;
        debug!(task = task.id, release = %request.name, "Release uploaded");
        Ok(UploadOutcome::Uploaded)
    }
}
