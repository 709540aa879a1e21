//! Web middleware
//!
//! Contains:
//! - session resolution: the session cookie is resolved once per request and
//!   handed to handlers as a [`Viewer`]
//! - the coarse cookie check on protected prefixes
//! - [`WebError`] and the session-expiry cleanup it triggers

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::models::{SessionState, SessionUser};
use crate::services::guard::{is_protected_path, GuardDecision, RoleGuard, DEFAULT_REDIRECT};
use crate::services::ServiceError;
use crate::theme::simple_error_page;
use crate::web::notice::Notice;
use crate::web::AppState;

/// Who is making the request
#[derive(Debug, Clone)]
pub struct Viewer {
    pub token: Option<String>,
    pub session: SessionState,
}

impl Viewer {
    pub fn user(&self) -> Option<&SessionUser> {
        self.session.user()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Run `guard` against this viewer
    pub fn require(&self, guard: &RoleGuard) -> Result<SessionUser, WebError> {
        match guard.check(&self.session) {
            GuardDecision::Allow(user) => Ok(user),
            GuardDecision::Redirect(to) => Err(WebError::Redirect(to)),
            // Sessions are resolved before handlers run.
            GuardDecision::Wait => Err(WebError::Redirect(DEFAULT_REDIRECT.to_string())),
        }
    }
}

/// Marker left on a response whose request hit an expired session
#[derive(Debug, Clone, Copy)]
struct SessionExpired;

/// Errors a page handler can end with
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Guard rejection or a deliberate bounce
    #[error("redirect to {0}")]
    Redirect(String),

    /// The backend rejected the session
    #[error("session expired")]
    SessionExpired,

    #[error("{0}")]
    Template(String),
}

impl From<anyhow::Error> for WebError {
    fn from(e: anyhow::Error) -> Self {
        WebError::Template(e.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Redirect(to) => Redirect::to(&to).into_response(),
            WebError::SessionExpired => {
                let notice = Notice::warning(ServiceError::SessionExpired.to_string());
                let mut response = notice.redirect(DEFAULT_REDIRECT).into_response();
                response.extensions_mut().insert(SessionExpired);
                response
            }
            WebError::Template(message) => {
                tracing::error!("Page rendering failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(simple_error_page("Não foi possível exibir esta página.")),
                )
                    .into_response()
            }
        }
    }
}

/// Read cookie `name` from the request headers
pub fn session_token(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// `Set-Cookie` value storing the session token
pub fn session_cookie(name: &str, token: &str, max_age_seconds: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, token, max_age_seconds
    )
}

/// `Set-Cookie` value removing the session cookie
pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

/// Session middleware
///
/// Requests to a protected prefix without a session cookie are sent home
/// before any handler runs. Everything else gets a [`Viewer`] extension.
/// When the response reports an expired session, the cached session is
/// dropped and the cookie cleared.
pub async fn resolve_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let cookie_name = state.config.auth.cookie_name.as_str();
    let token = session_token(request.headers(), cookie_name);

    if token.is_none() && is_protected_path(request.uri().path()) {
        tracing::debug!(path = %request.uri().path(), "No session cookie, redirecting");
        return Redirect::to(DEFAULT_REDIRECT).into_response();
    }

    let session = state.sessions.resolve(token.as_deref()).await;
    request.extensions_mut().insert(Viewer {
        token: token.clone(),
        session,
    });

    let mut response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some() {
        tracing::warn!("Session expired, signing the visitor out");
        if let Some(token) = token.as_deref() {
            state.sessions.invalidate(token).await;
        }
        if let Ok(value) = HeaderValue::from_str(&clear_session_cookie(cookie_name)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}
