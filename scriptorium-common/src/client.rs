//! HTTP client for the pipeline backend's REST API
//!
//! One method per backend endpoint. Every call is independent: no retries,
//! no caching, no ordering between calls.

use reqwest::{multipart, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::DashboardConfig;
use crate::model::{
    AlignTaskCreate, Draft, DraftTaskCreate, ExtractTaskCreate, HttpValidationError,
    ParatextProject, Scripture, Task, TrainTaskCreate,
};
use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

const USER_AGENT: &str = concat!("scriptorium/", env!("CARGO_PKG_VERSION"));

/// Filter for `GET /tasks/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQuery {
    pub skip: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
            project_id: None,
        }
    }
}

impl TaskQuery {
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }
}

/// Filter for `GET /drafts/` and `GET /drafts/download_drafts`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_name: Option<String>,
}

/// One file of a project upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Path relative to the uploaded folder, e.g. `ABC/Settings.xml`
    pub relative_path: String,
    pub bytes: Vec<u8>,
}

/// Binary body returned by a download endpoint
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Backend REST client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid API URL {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("API URL {} cannot be a base", base_url)));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    pub async fn list_projects(&self, skip: u32, limit: u32) -> Result<Vec<ParatextProject>> {
        let url = self.endpoint(&["projects", ""])?;
        self.get_json(url, &[("skip", skip.to_string()), ("limit", limit.to_string())])
            .await
    }

    /// Projects whose extracted scripture file is `filename`
    pub async fn projects_by_scripture(&self, filename: &str) -> Result<Vec<ParatextProject>> {
        let url = self.endpoint(&["projects", ""])?;
        self.get_json(url, &[("scripture_filename", filename.to_string())])
            .await
    }

    pub async fn get_project(&self, id: &str) -> Result<ParatextProject> {
        let url = self.endpoint(&["projects", id])?;
        self.get_json(url, &()).await
    }

    /// Upload a Paratext project folder as multipart `files` parts
    pub async fn create_project(&self, files: Vec<UploadFile>) -> Result<ParatextProject> {
        if files.is_empty() {
            return Err(Error::InvalidInput("no files to upload".to_string()));
        }

        let url = self.endpoint(&["projects", ""])?;
        let count = files.len();
        let form = files.into_iter().fold(multipart::Form::new(), |form, file| {
            form.part(
                "files",
                multipart::Part::bytes(file.bytes).file_name(file.relative_path),
            )
        });

        tracing::debug!(url = %url, files = count, "POST multipart to backend");
        let response = self.http.post(url.clone()).multipart(form).send().await?;
        let response = check_status(response, &url).await?;
        decode_json(response, &url).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["projects", id])?;
        self.delete(url).await
    }

    pub async fn download_project_drafts(&self, id: &str) -> Result<Download> {
        let url = self.endpoint(&["projects", id, "download_drafts"])?;
        self.download(url, &()).await
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let url = self.endpoint(&["tasks", ""])?;
        self.get_json(url, query).await
    }

    pub async fn get_task(&self, id: &str) -> Result<Task> {
        let url = self.endpoint(&["tasks", id])?;
        self.get_json(url, &()).await
    }

    pub async fn create_align_task(&self, body: &AlignTaskCreate) -> Result<Task> {
        self.post_json(&["tasks", "align_task"], body).await
    }

    pub async fn create_train_task(&self, body: &TrainTaskCreate) -> Result<Task> {
        self.post_json(&["tasks", "train_task"], body).await
    }

    pub async fn create_draft_task(&self, body: &DraftTaskCreate) -> Result<Task> {
        self.post_json(&["tasks", "draft_task"], body).await
    }

    pub async fn create_extract_task(&self, body: &ExtractTaskCreate) -> Result<Task> {
        self.post_json(&["tasks", "extract_task"], body).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["tasks", id])?;
        self.delete(url).await
    }

    // ------------------------------------------------------------------
    // Scriptures, drafts, language codes
    // ------------------------------------------------------------------

    /// Scripture files, optionally filtered by a backend-side text query
    pub async fn list_scriptures(
        &self,
        query: Option<&str>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Scripture>> {
        let url = self.endpoint(&["scriptures", ""])?;
        let mut params = Vec::with_capacity(3);
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            params.push(("query", q.to_string()));
        }
        params.push(("skip", skip.to_string()));
        params.push(("limit", limit.to_string()));
        self.get_json(url, &params).await
    }

    /// First scripture matching `id` as a query, if any
    pub async fn get_scripture(&self, id: &str) -> Result<Option<Scripture>> {
        let url = self.endpoint(&["scriptures", ""])?;
        let found: Vec<Scripture> = self.get_json(url, &[("query", id)]).await?;
        Ok(found.into_iter().next())
    }

    pub async fn list_drafts(&self, query: &DraftQuery) -> Result<Vec<Draft>> {
        let url = self.endpoint(&["drafts", ""])?;
        self.get_json(url, query).await
    }

    pub async fn download_drafts(&self, query: &DraftQuery) -> Result<Download> {
        let url = self.endpoint(&["drafts", "download_drafts"])?;
        self.download(url, query).await
    }

    /// Script-qualified codes the backend suggests for an ISO language code
    pub async fn lang_codes(&self, lang_code: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["lang_codes", ""])?;
        self.get_json(url, &[("lang_code", lang_code)]).await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    /// Base URL plus percent-encoded path segments; a trailing `""` yields `/`
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T, Q>(&self, url: Url, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send(Method::GET, url, query).await?;
        let url = response.url().clone();
        decode_json(response, &url).await
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        tracing::debug!(url = %url, "POST to backend");
        let response = self.http.post(url.clone()).json(body).send().await?;
        let response = check_status(response, &url).await?;
        decode_json(response, &url).await
    }

    async fn delete(&self, url: Url) -> Result<()> {
        self.send(Method::DELETE, url, &()).await?;
        Ok(())
    }

    async fn download<Q>(&self, url: Url, query: &Q) -> Result<Download>
    where
        Q: Serialize + ?Sized,
    {
        let response = self.send(Method::GET, url, query).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/zip")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        tracing::debug!(size = bytes.len(), content_type = %content_type, "Download complete");
        Ok(Download {
            bytes,
            content_type,
        })
    }

    async fn send<Q>(&self, method: Method, url: Url, query: &Q) -> Result<Response>
    where
        Q: Serialize + ?Sized,
    {
        let request = self.http.request(method.clone(), url).query(query).build()?;
        let url = request.url().clone();
        tracing::debug!(method = %method, url = %url, "Backend request");
        let response = self.http.execute(request).await?;
        check_status(response, &url).await
    }
}

/// Map non-2xx responses to `Error::Status`, keeping any backend detail text
async fn check_status(response: Response, url: &Url) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body);
    tracing::debug!(status = status.as_u16(), url = %url, detail = ?detail, "Backend error response");

    Err(Error::Status {
        status: status.as_u16(),
        url: url.to_string(),
        detail,
    })
}

/// Validation messages (`{"detail": [...]}`) or a plain `{"detail": "..."}`
fn error_detail(body: &str) -> Option<String> {
    if let Ok(validation) = serde_json::from_str::<HttpValidationError>(body) {
        if let Some(summary) = validation.summary() {
            return Some(summary);
        }
    }
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .map(str::to_string)
}

async fn decode_json<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Decode(format!("{}: {}", url, e)))
}
