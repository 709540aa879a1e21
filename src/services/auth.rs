//! Auth provider client
//!
//! Email/password sign-in and sign-up, sign-out and session lookup against
//! the auth provider mounted on the backend (`/api/auth` by default).
//! The provider hands out its session token through `Set-Cookie`; we pick it
//! out and let the web layer set our own cookie with it.

use std::sync::Arc;

use reqwest::{header, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::models::{SessionEnvelope, SessionUser};
use crate::services::error::{ErrorText, ServiceError};
use crate::services::http::{error_from_body, extract_message, ApiClient};

/// Provider message for bad credentials
const INVALID_CREDENTIALS: &str = "Invalid email or password";

const SIGN_IN: ErrorText = ErrorText::new("Ocorreu um erro inesperado.", "Ocorreu um erro inesperado.");
const SIGN_UP: ErrorText = ErrorText::new("Erro ao criar conta.", "Erro ao criar conta.");
const SIGN_OUT: ErrorText = ErrorText::new("Erro ao sair.", "Erro ao sair.");
const SESSION: ErrorText = ErrorText::new(
    "Erro ao verificar a sessão.",
    "Ocorreu um erro desconhecido ao verificar a sessão.",
);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Client for the auth provider
#[derive(Debug, Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
    base_path: String,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>, base_path: &str) -> Self {
        Self {
            client,
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    fn path(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_path, endpoint)
    }

    /// Sign in with email and password; returns the session token
    pub async fn sign_in_email(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let request = self
            .client
            .request(Method::POST, &self.path("sign-in/email"), None)
            .json(&SignInBody { email, password });
        let response = self.client.dispatch(request, SIGN_IN).await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response_message(response).await;
            tracing::warn!(status, "Sign-in rejected: {:?}", message);
            let message = match message.as_deref() {
                Some(INVALID_CREDENTIALS) => "E-mail ou senha incorretos.",
                _ => SIGN_IN.rejected,
            };
            return Err(ServiceError::Api {
                status,
                message: message.to_string(),
            });
        }

        let token = self.session_token(response).await?;
        tracing::info!("User signed in");
        Ok(token)
    }

    /// Create an account and sign it in; returns the session token
    pub async fn sign_up_email(&self, name: &str, email: &str, password: &str) -> Result<String, ServiceError> {
        let request = self
            .client
            .request(Method::POST, &self.path("sign-up/email"), None)
            .json(&SignUpBody { name, email, password });
        let response = self.client.dispatch(request, SIGN_UP).await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response_message(response)
                .await
                .unwrap_or_else(|| SIGN_UP.rejected.to_string());
            tracing::warn!(status, "Sign-up rejected: {}", message);
            return Err(ServiceError::Api { status, message });
        }

        let token = self.session_token(response).await?;
        tracing::info!("Account created");
        Ok(token)
    }

    /// End the provider session behind `token`
    pub async fn sign_out(&self, token: &str) -> Result<(), ServiceError> {
        let request = self
            .client
            .request(Method::POST, &self.path("sign-out"), Some(token))
            .json(&serde_json::json!({}));
        let response = self.client.dispatch(request, SIGN_OUT).await?;
        // An already dead session is as signed out as it gets.
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status, &body, SIGN_OUT))
    }

    /// Look up the user behind `token`; `None` when the provider knows no such session
    pub async fn get_session(&self, token: &str) -> Result<Option<SessionUser>, ServiceError> {
        let request = self
            .client
            .request(Method::GET, &self.path("get-session"), Some(token));
        let response = self.client.dispatch(request, SESSION).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(error_from_body(status, &body, SESSION));
        }
        if body.trim().is_empty() {
            return Ok(None);
        }
        let envelope: Option<SessionEnvelope> =
            serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))?;
        Ok(envelope.map(|e| e.user))
    }

    /// Session token from `Set-Cookie`, or from a `token` field in the body
    async fn session_token(&self, response: Response) -> Result<String, ServiceError> {
        let from_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|cookie| cookie_value(cookie, self.client.cookie_name()));
        if let Some(token) = from_cookie {
            return Ok(token);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        body.get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .ok_or_else(|| ServiceError::Decode("missing session token".to_string()))
    }
}

async fn response_message(response: Response) -> Option<String> {
    let body: Value = response.json().await.ok()?;
    extract_message(&body)
}

/// Value of cookie `name` in a `Set-Cookie` header line
///
/// The provider prefixes its cookies with `__Secure-` when served over HTTPS.
fn cookie_value(set_cookie: &str, name: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?.trim();
    let (key, value) = pair.split_once('=')?;
    let key = key.strip_prefix("__Secure-").unwrap_or(key);
    (key == name && !value.is_empty()).then(|| value.to_string())
}
