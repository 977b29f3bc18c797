//! Euphrosyne session client
//!
//! Owns the bearer token pair and implements the authenticated-request
//! protocol: every outgoing request carries `Authorization: Bearer <access>`,
//! and a 401 response triggers exactly one token refresh followed by exactly
//! one replay of the original request. The refreshed access token is persisted
//! to the token store before the replay goes out.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::error::{ApiError, Result};
use crate::store::{StoredTokens, TokenStore};

/// Extract the `exp` claim from a JWT, if the token is well-formed
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    use base64::{Engine as _, engine::general_purpose};

    #[derive(Deserialize)]
    struct Claims {
        exp: Option<i64>,
    }

    // JWT payload segments are base64url; tolerate padded variants too
    let payload_b64 = token.split('.').nth(1)?;
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64.trim_end_matches('='))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&payload).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// Check whether an access token has passed its `exp` claim.
///
/// A token with no readable `exp` claim is treated as expired so that a
/// malformed or truncated token forces a refresh instead of a crash.
pub fn is_token_expired(token: &str) -> bool {
    match token_expiry(token) {
        Some(expires_at) => expires_at < Utc::now(),
        None => true,
    }
}

/// Authenticated client for the Euphrosyne API
pub struct SessionClient {
    http: HttpClient,
    host: String,
    store: TokenStore,
    tokens: RwLock<StoredTokens>,
}

impl SessionClient {
    /// Create a session client from a previously stored token pair
    pub fn new(host: impl Into<String>, tokens: StoredTokens, store: TokenStore) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        Ok(Self {
            http,
            host: host.into(),
            store,
            tokens: RwLock::new(tokens),
        })
    }

    /// Authenticate with email and password, returning a fresh token pair.
    ///
    /// Single attempt: any non-200 status is a rejected login surfaced to the
    /// user, never retried here.
    pub async fn login(host: &str, email: &str, password: &str) -> Result<StoredTokens> {
        #[derive(Deserialize)]
        struct LoginResponse {
            access: String,
            refresh: String,
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        let url = format!("{}/api/auth/long-token/", host);
        let response = http
            .post(&url)
            .json(&json!({"email": email, "password": password}))
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status() != StatusCode::OK {
            return Err(ApiError::LoginRejected.into());
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))?;

        Ok(StoredTokens {
            access_token: body.access,
            refresh_token: body.refresh,
        })
    }

    /// Base URL of the Euphrosyne host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Current access token value
    pub async fn access_token(&self) -> String {
        self.tokens.read().await.access_token.clone()
    }

    /// Build a request against an absolute URL using the shared HTTP client
    pub fn request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// `Ok(None)` means the server rejected the refresh token and the caller
    /// must fall back to an interactive login. The refresh token itself is not
    /// rotated by this endpoint.
    pub async fn refresh(&self) -> Result<Option<String>> {
        #[derive(Deserialize)]
        struct RefreshResponse {
            access: String,
        }

        let refresh_token = self.tokens.read().await.refresh_token.clone();
        let url = format!("{}/api/auth/token/refresh/", self.host);
        let response = self
            .http
            .post(&url)
            .json(&json!({"refresh": refresh_token}))
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status() != StatusCode::OK {
            log::debug!("token refresh rejected with status {}", response.status());
            return Ok(None);
        }

        let body: RefreshResponse = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse refresh response: {}", e))
        })?;

        Ok(Some(body.access))
    }

    /// Make sure the stored access token is usable, refreshing it once if it
    /// has expired. Returns `false` when an interactive login is required.
    pub async fn ensure_fresh(&self) -> Result<bool> {
        let access = self.access_token().await;
        if !is_token_expired(&access) {
            return Ok(true);
        }

        log::debug!("access token expired, attempting refresh");
        match self.refresh().await? {
            Some(access) => {
                self.install_access_token(&access).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Send an authenticated request, refreshing the token once on a 401.
    ///
    /// The replay is terminal: if it comes back 401 as well, the session is
    /// surfaced as unauthorized with no further refresh attempts.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let replay = request.try_clone();
        let access = self.access_token().await;

        let response = request
            .bearer_auth(&access)
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let access = match self.refresh().await? {
            Some(access) => access,
            None => return Err(ApiError::Unauthorized.into()),
        };

        // Persist before replaying so a crash mid-replay does not lose the
        // only copy of the fresh token.
        self.install_access_token(&access).await?;

        let replay = replay.ok_or_else(|| {
            ApiError::InvalidResponse("request with streaming body cannot be replayed".to_string())
        })?;
        let response = replay
            .bearer_auth(&access)
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized.into());
        }

        Ok(response)
    }

    async fn install_access_token(&self, access: &str) -> Result<()> {
        {
            let mut tokens = self.tokens.write().await;
            tokens.access_token = access.to_string();
        }
        self.store.update_access_token(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose};

    /// Build a JWT-shaped token with the given payload JSON
    fn make_token(payload: &str) -> String {
        let segment = general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("header.{}.signature", segment)
    }

    fn token_with_exp(exp: i64) -> String {
        make_token(&format!(r#"{{"exp": {}}}"#, exp))
    }

    fn temp_session(host: &str, access: &str, refresh: &str) -> (tempfile::TempDir, SessionClient) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("credentials.yaml"));
        let tokens = StoredTokens {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        };
        store.save(&tokens).unwrap();
        let session = SessionClient::new(host, tokens, store).unwrap();
        (dir, session)
    }

    #[test]
    fn test_expired_token_in_the_past() {
        let token = token_with_exp(Utc::now().timestamp() - 3600);
        assert!(is_token_expired(&token));
    }

    #[test]
    fn test_valid_token_in_the_future() {
        let token = token_with_exp(Utc::now().timestamp() + 3600);
        assert!(!is_token_expired(&token));
    }

    #[test]
    fn test_token_without_exp_claim_is_expired() {
        let token = make_token(r#"{"sub": "user@example.org"}"#);
        assert!(is_token_expired(&token));
    }

    #[test]
    fn test_malformed_tokens_are_expired_not_panics() {
        assert!(is_token_expired(""));
        assert!(is_token_expired("not-a-jwt"));
        assert!(is_token_expired("only.two"));
        assert!(is_token_expired("a.%%%not-base64%%%.c"));

        let not_json = format!(
            "a.{}.c",
            general_purpose::URL_SAFE_NO_PAD.encode("plain text")
        );
        assert!(is_token_expired(&not_json));
    }

    #[test]
    fn test_padded_payload_segment_is_accepted() {
        let exp = Utc::now().timestamp() + 3600;
        let segment = general_purpose::URL_SAFE.encode(format!(r#"{{"exp": {}}}"#, exp));
        let token = format!("header.{}.signature", segment);

        assert!(!is_token_expired(&token));
        assert_eq!(token_expiry(&token).unwrap().timestamp(), exp);
    }

    #[test]
    fn test_token_expiry_extraction() {
        let exp = Utc::now().timestamp() + 60;
        let token = token_with_exp(exp);
        assert_eq!(token_expiry(&token).unwrap().timestamp(), exp);
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/auth/long-token/")
            .with_status(200)
            .with_body(r#"{"access": "acc-1", "refresh": "ref-1"}"#)
            .create_async()
            .await;

        let tokens = SessionClient::login(&server.url(), "user@example.org", "hunter2")
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "acc-1");
        assert_eq!(tokens.refresh_token, "ref-1");
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/auth/long-token/")
            .with_status(401)
            .with_body(r#"{"detail": "No active account found"}"#)
            .create_async()
            .await;

        let err = SessionClient::login(&server.url(), "user@example.org", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Api(ApiError::LoginRejected)
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejected_returns_none() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/auth/token/refresh/")
            .with_status(401)
            .with_body(r#"{"detail": "Token is invalid"}"#)
            .create_async()
            .await;

        let (_dir, session) = temp_session(&server.url(), "old-access", "old-refresh");
        assert!(session.refresh().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_refreshes_once_on_401_and_persists_token() {
        let mut server = mockito::Server::new_async().await;

        let stale = server
            .mock("GET", "/api/lab/projects/")
            .match_header("authorization", "Bearer old-access")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/api/auth/token/refresh/")
            .with_status(200)
            .with_body(r#"{"access": "new-access"}"#)
            .expect(1)
            .create_async()
            .await;
        let replay = server
            .mock("GET", "/api/lab/projects/")
            .match_header("authorization", "Bearer new-access")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let (_dir, session) = temp_session(&server.url(), "old-access", "old-refresh");
        let url = format!("{}/api/lab/projects/", server.url());
        let response = session
            .send(session.request(reqwest::Method::GET, &url))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        stale.assert_async().await;
        refresh.assert_async().await;
        replay.assert_async().await;

        // Refreshed token is live in memory and on disk
        assert_eq!(session.access_token().await, "new-access");
        let stored = session.store.load().unwrap().unwrap();
        assert_eq!(stored.access_token, "new-access");
        assert_eq!(stored.refresh_token, "old-refresh");
    }

    #[tokio::test]
    async fn test_send_gives_up_after_one_refresh() {
        let mut server = mockito::Server::new_async().await;

        // Both the original request and the replay come back 401
        let _unauthorized = server
            .mock("GET", "/api/lab/projects/")
            .with_status(401)
            .expect(2)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/api/auth/token/refresh/")
            .with_status(200)
            .with_body(r#"{"access": "new-access"}"#)
            .expect(1)
            .create_async()
            .await;

        let (_dir, session) = temp_session(&server.url(), "old-access", "old-refresh");
        let url = format!("{}/api/lab/projects/", server.url());
        let err = session
            .send(session.request(reqwest::Method::GET, &url))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::Error::Api(ApiError::Unauthorized)
        ));
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_surfaces_rejected_refresh_without_replay() {
        let mut server = mockito::Server::new_async().await;

        let first = server
            .mock("GET", "/api/lab/projects/")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let _refresh = server
            .mock("POST", "/api/auth/token/refresh/")
            .with_status(401)
            .create_async()
            .await;

        let (_dir, session) = temp_session(&server.url(), "old-access", "revoked-refresh");
        let url = format!("{}/api/lab/projects/", server.url());
        let err = session
            .send(session.request(reqwest::Method::GET, &url))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::Error::Api(ApiError::Unauthorized)
        ));
        first.assert_async().await;
    }

    #[tokio::test]
    async fn test_ensure_fresh_with_valid_token_skips_refresh() {
        let server = mockito::Server::new_async().await;
        // No refresh mock: a refresh attempt would fail the test via 501
        let token = token_with_exp(Utc::now().timestamp() + 3600);
        let (_dir, session) = temp_session(&server.url(), &token, "refresh");
        assert!(session.ensure_fresh().await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_fresh_refreshes_expired_token() {
        let mut server = mockito::Server::new_async().await;
        let refresh = server
            .mock("POST", "/api/auth/token/refresh/")
            .with_status(200)
            .with_body(r#"{"access": "fresh-access"}"#)
            .expect(1)
            .create_async()
            .await;

        let expired = token_with_exp(Utc::now().timestamp() - 60);
        let (_dir, session) = temp_session(&server.url(), &expired, "refresh");

        assert!(session.ensure_fresh().await.unwrap());
        assert_eq!(session.access_token().await, "fresh-access");
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_ensure_fresh_reports_login_required() {
        let mut server = mockito::Server::new_async().await;
        let _refresh = server
            .mock("POST", "/api/auth/token/refresh/")
            .with_status(401)
            .create_async()
            .await;

        let expired = token_with_exp(Utc::now().timestamp() - 60);
        let (_dir, session) = temp_session(&server.url(), &expired, "revoked");

        assert!(!session.ensure_fresh().await.unwrap());
    }
}
