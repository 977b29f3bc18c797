//! Remote catalog client
//!
//! Fetches the projects visible to the authenticated user. Results are
//! memoized per (host, access token) for the lifetime of this client; a new
//! token value invalidates the entry, so a fresh login sees fresh data.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::RwLock;

use super::models::Project;
use super::session::SessionClient;
use crate::error::{ApiError, Result};

/// Catalog listing operations
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// List the projects visible to the current session.
    ///
    /// An empty list is a valid answer, not an error.
    async fn list_projects(&self) -> Result<Vec<Project>>;
}

/// Catalog client backed by the Euphrosyne API
pub struct CatalogClient {
    session: Arc<SessionClient>,
    cache: RwLock<HashMap<(String, String), Vec<Project>>>,
}

impl CatalogClient {
    pub fn new(session: Arc<SessionClient>) -> Self {
        Self {
            session,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let key = (
            self.session.host().to_string(),
            self.session.access_token().await,
        );

        if let Some(projects) = self.cache.read().await.get(&key) {
            log::debug!("catalog cache hit for {}", key.0);
            return Ok(projects.clone());
        }

        let url = format!("{}/api/lab/projects/", self.session.host());
        let response = self
            .session
            .send(self.session.request(reqwest::Method::GET, &url))
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status.as_u16(), body).into());
        }

        let projects: Vec<Project> = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse project list: {}", e))
        })?;

        self.cache.write().await.insert(key, projects.clone());
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoredTokens, TokenStore};

    fn session_for(host: &str) -> (tempfile::TempDir, Arc<SessionClient>) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("credentials.yaml"));
        let tokens = StoredTokens {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        };
        store.save(&tokens).unwrap();
        let session = Arc::new(SessionClient::new(host, tokens, store).unwrap());
        (dir, session)
    }

    #[tokio::test]
    async fn test_list_projects() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/lab/projects/")
            .match_header("authorization", "Bearer access")
            .with_status(200)
            .with_body(
                r#"[
                    {
                        "name": "P",
                        "slug": "p",
                        "runs": [
                            {
                                "label": "R1",
                                "particle_type": "proton",
                                "energy_in_keV": 2000,
                                "objects": [],
                                "methods_url": "https://lab/api/runs/1/methods/"
                            }
                        ]
                    }
                ]"#,
            )
            .create_async()
            .await;

        let (_dir, session) = session_for(&server.url());
        let catalog = CatalogClient::new(session);
        let projects = catalog.list_projects().await.unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "P");
        assert_eq!(projects[0].runs[0].label, "R1");
    }

    #[tokio::test]
    async fn test_list_projects_is_memoized_per_token() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/api/lab/projects/")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let (_dir, session) = session_for(&server.url());
        let catalog = CatalogClient::new(session);

        assert!(catalog.list_projects().await.unwrap().is_empty());
        assert!(catalog.list_projects().await.unwrap().is_empty());

        // Second call served from the session-scoped cache
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_project_list_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/lab/projects/")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let (_dir, session) = session_for(&server.url());
        let catalog = CatalogClient::new(session);
        assert!(catalog.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/lab/projects/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let (_dir, session) = session_for(&server.url());
        let catalog = CatalogClient::new(session);
        let err = catalog.list_projects().await.unwrap_err();

        assert!(matches!(
            err,
            crate::error::Error::Api(ApiError::Http(500, _))
        ));
    }
}
