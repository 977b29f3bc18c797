//! Euphrosyne tools client
//!
//! Talks to the tools host: idempotent remote folder creation and the
//! short-lived upload-credential exchange.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::models::{DataType, UploadCredential};
use super::session::SessionClient;
use crate::error::{ApiError, Result};

/// Marker the tools API puts in the 400 body when a folder already exists.
/// The API has no dedicated no-op status, so idempotence comes from matching
/// this message. Kept in one place in case the service grows a structured
/// error code.
const ALREADY_EXISTS_MARKER: &str = "The specified resource already exists";

/// Check whether a 400 body reports an already-existing folder
fn is_already_exists(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(String::from)))
        .is_some_and(|detail| detail.contains(ALREADY_EXISTS_MARKER))
}

/// Folder initialization and credential exchange operations
#[async_trait]
pub trait ToolsApi: Send + Sync {
    /// Create the remote project and run folders, treating "already exists"
    /// as success. The run-level call is only made once the project-level one
    /// has succeeded or no-oped.
    async fn init_folders(&self, project_name: &str, run_name: &str) -> Result<()>;

    /// Fetch a short-lived upload credential scoped to one
    /// (project, run, data type) triple. The credential is never persisted.
    async fn get_upload_credential(
        &self,
        project_name: &str,
        run_name: &str,
        data_type: DataType,
    ) -> Result<UploadCredential>;
}

/// Tools client backed by the Euphrosyne tools host
pub struct ToolsClient {
    session: Arc<SessionClient>,
    host: String,
}

impl ToolsClient {
    pub fn new(session: Arc<SessionClient>, host: impl Into<String>) -> Self {
        Self {
            session,
            host: host.into(),
        }
    }

    async fn init_folder(&self, url: String, what: &str) -> Result<()> {
        let response = self
            .session
            .send(self.session.request(reqwest::Method::POST, &url))
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                if is_already_exists(&body) {
                    log::debug!("{} folder already exists, continuing", what);
                    Ok(())
                } else {
                    Err(ApiError::InitFolders(body).into())
                }
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::InitFolders(body).into())
            }
        }
    }
}

#[async_trait]
impl ToolsApi for ToolsClient {
    async fn init_folders(&self, project_name: &str, run_name: &str) -> Result<()> {
        self.init_folder(format!("{}/data/{}/init", self.host, project_name), "project")
            .await?;
        self.init_folder(
            format!("{}/data/{}/runs/{}/init", self.host, project_name, run_name),
            "run",
        )
        .await
    }

    async fn get_upload_credential(
        &self,
        project_name: &str,
        run_name: &str,
        data_type: DataType,
    ) -> Result<UploadCredential> {
        let url = format!(
            "{}/data/{}/runs/{}/upload/shared_access_signature?data_type={}",
            self.host,
            project_name,
            run_name,
            data_type.as_query()
        );

        let response = self
            .session
            .send(self.session.request(reqwest::Method::GET, &url))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status.as_u16(), body).into());
        }

        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse upload credential: {}", e)).into()
        })
    }
}
