//! HTTP transport shared by every service.
//!
//! Attaches the bearer token from the persisted session to each request and
//! reacts to 401 responses by ending the session and sending the user to
//! the login route.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::navigation::{routes, Navigator};
use crate::storage::PersistedSession;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// JSON client for the FinTrack API
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: PersistedSession,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a client for the configured environment
    pub fn new(
        config: &ClientConfig,
        session: PersistedSession,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        Self::with_base_url(config.base_url(), config.timeout(), session, navigator)
    }

    /// Create a client against an explicit base URL
    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        session: PersistedSession,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        if base_url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("FinTrack/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &PersistedSession {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, |req| req).await
    }

    /// GET with query parameters; `None` fields are omitted
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::GET, path, |req| req.query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, |req| req.json(body)).await
    }

    /// POST without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::POST, path, |req| req).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, |req| req.json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::DELETE, path, |req| req).await
    }

    /// Whether `GET /health` answers with a success status.
    ///
    /// Sent without credentials and never triggers the 401 handling.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(url = %url, error = %e, "Health check failed");
                false
            }
        }
    }

    async fn send<T, F>(&self, method: Method, path: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "API request");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = self.session.access_token().await? {
            request = request.bearer_auth(token);
        }

        let response = build(request).send().await.map_err(map_send_error)?;
        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(|e| {
                ClientError::ParseError(format!("{method} {path}: {e}"))
            });
        }

        if status == StatusCode::UNAUTHORIZED && !is_login_request(path) {
            self.end_session().await;
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            message = ?message,
            "API request failed"
        );

        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn end_session(&self) {
        warn!("Session rejected by server, signing out");
        if let Err(e) = self.session.clear().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        if !self.navigator.current_path().contains(routes::LOGIN) {
            self.navigator.navigate(routes::LOGIN);
        }
    }
}

fn is_login_request(path: &str) -> bool {
    path.contains("/auth/login")
}

fn map_send_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else if e.is_connect() {
        ClientError::ServerUnreachable(e.to_string())
    } else {
        ClientError::Request(e)
    }
}

/// Message from an error body: joined `details[].message`, then `message`,
/// then `error`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(details) = value.get("details").and_then(|d| d.as_array()) {
        let messages: Vec<&str> = details
            .iter()
            .filter_map(|d| d.get("message").and_then(|m| m.as_str()))
            .collect();
        if !messages.is_empty() {
            return Some(messages.join(", "));
        }
    }

    ["message", "error"]
        .iter()
        .find_map(|key| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
        })
        .map(str::to_string)
}
