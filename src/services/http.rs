//! HTTP client for the EducaMais REST backend
//!
//! Wraps a `reqwest::Client` with:
//! - the backend base URL and request timeout
//! - forwarding of the caller's session cookie
//! - translation of non-2xx responses into [`ServiceError`]
//!
//! A 401 response, or an error body whose `code` is `SESSION_EXPIRED`, is
//! reported as [`ServiceError::SessionExpired`] so the caller can drop the
//! session and send the visitor home.

use anyhow::Context;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::BackendConfig;
use crate::services::error::{ErrorText, ServiceError};

/// Error code the backend uses for sessions it has terminated
pub const SESSION_EXPIRED_CODE: &str = "SESSION_EXPIRED";

/// Shared HTTP client for backend and auth-provider requests
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    cookie_name: String,
}

impl ApiClient {
    /// Create a client for the backend described by `config`
    pub fn new(config: &BackendConfig, cookie_name: &str) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("educamais/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie_name: cookie_name.to_string(),
        })
    }

    /// Name of the session cookie forwarded to the backend
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Absolute URL of a backend path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request, attaching the session cookie when one is given
    pub fn request(&self, method: Method, path: &str, session: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match session {
            Some(token) => builder.header(header::COOKIE, format!("{}={}", self.cookie_name, token)),
            None => builder,
        }
    }

    /// Send a request and decode its JSON body
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        text: ErrorText,
    ) -> Result<T, ServiceError> {
        let response = self.send(request, text).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::warn!("Failed to decode backend response: {}", e);
            ServiceError::Decode(e.to_string())
        })
    }

    /// Send a request whose response body is irrelevant
    pub async fn send_empty(&self, request: RequestBuilder, text: ErrorText) -> Result<(), ServiceError> {
        self.send(request, text).await.map(drop)
    }

    /// Send a request and return the successful response
    pub async fn send(&self, request: RequestBuilder, text: ErrorText) -> Result<Response, ServiceError> {
        let response = self.dispatch(request, text).await?;
        check_status(response, text).await
    }

    /// Send a request and return the response whatever its status
    ///
    /// Only a missing response is an error here.
    pub async fn dispatch(&self, request: RequestBuilder, text: ErrorText) -> Result<Response, ServiceError> {
        let request = request
            .build()
            .map_err(|e| ServiceError::Unreachable(format!("{} ({})", text.unreachable, e)))?;
        tracing::debug!(method = %request.method(), url = %request.url(), "backend request");

        self.http.execute(request).await.map_err(|e| {
            tracing::warn!("Backend unreachable: {}", e);
            ServiceError::Unreachable(text.unreachable.to_string())
        })
    }
}

/// Turn a non-2xx response into the matching [`ServiceError`]
async fn check_status(response: Response, text: ErrorText) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = error_from_body(status, &body, text);
    tracing::warn!(status = status.as_u16(), "Backend rejected request: {}", error);
    Err(error)
}

/// Build the error for a rejected response from its status and raw body
pub(crate) fn error_from_body(status: StatusCode, body: &str, text: ErrorText) -> ServiceError {
    let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    let code = json
        .get("code")
        .or_else(|| json.pointer("/error/code"))
        .and_then(Value::as_str);
    if status == StatusCode::UNAUTHORIZED || code == Some(SESSION_EXPIRED_CODE) {
        return ServiceError::SessionExpired;
    }

    ServiceError::Api {
        status: status.as_u16(),
        message: extract_message(&json).unwrap_or_else(|| text.rejected.to_string()),
    }
}

/// Pull a human message out of an error body
///
/// Accepts `{ "message": ".." }` as well as `{ "error": { "message": ".." } }`.
pub(crate) fn extract_message(json: &Value) -> Option<String> {
    json.get("message")
        .or_else(|| json.pointer("/error/message"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}
