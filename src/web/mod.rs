//! Web layer - server-rendered pages
//!
//! Routes:
//! - public: home (`/`), post detail (`/posts/{id}`)
//! - auth: sign-in, sign-up, sign-out under `/admin`
//! - staff area: dashboard, post create/edit/delete, teacher and student management

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use tera::Context as TeraContext;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::config::Config;
use crate::services::{ApiClient, AuthService, PostService, ServiceError, SessionResolver, UserService};
use crate::theme::{StandardTemplateVars, ThemeEngine};

pub mod auth;
pub mod middleware;
pub mod notice;
pub mod posts;
pub mod public;
pub mod users;
pub mod views;

pub use middleware::{Viewer, WebError};
pub use notice::{Notice, NoticeQuery};
pub use users::Section;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub posts: Arc<PostService>,
    pub users: Arc<UserService>,
    pub auth: Arc<AuthService>,
    pub sessions: Arc<SessionResolver>,
    pub theme: Arc<ThemeEngine>,
}

impl AppState {
    /// Wire up the services for `config`
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = Arc::new(ApiClient::new(&config.backend, &config.auth.cookie_name)?);
        let auth = Arc::new(AuthService::new(client.clone(), &config.auth.base_path));
        let sessions = Arc::new(SessionResolver::new(auth.clone(), &config.session_cache));

        Ok(Self {
            posts: Arc::new(PostService::new(client.clone())),
            users: Arc::new(UserService::new(client)),
            auth,
            sessions,
            theme: Arc::new(ThemeEngine::embedded()?),
            config: Arc::new(config),
        })
    }

    /// Render `template` with the standard variables for `viewer`
    pub fn render(
        &self,
        template: &str,
        context: &TeraContext,
        request_path: &str,
        viewer: &Viewer,
        notice: Option<Notice>,
    ) -> Result<Html<String>, WebError> {
        let vars = StandardTemplateVars::new(request_path)
            .with_user(viewer.user())
            .with_notice(notice);
        let html = self.theme.render_with_standard_vars(template, context, &vars)?;
        Ok(Html(html))
    }

    /// Error page for `message`; never fails
    pub fn error_page(&self, message: &str, request_path: &str, viewer: &Viewer) -> Html<String> {
        let vars = StandardTemplateVars::new(request_path).with_user(viewer.user());
        let mut context = TeraContext::from_serialize(&vars).unwrap_or_default();
        context.insert("error_message", message);
        Html(self.theme.render_with_fallback("error.html", &context))
    }
}

/// `?page=` of paginated screens
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// Turn an expired session into the page-ending [`WebError`]; hand back any other error
pub(crate) fn unless_expired(e: ServiceError) -> Result<ServiceError, WebError> {
    if e.is_session_expired() {
        Err(WebError::SessionExpired)
    } else {
        Ok(e)
    }
}

async fn not_found(State(state): State<AppState>, Extension(viewer): Extension<Viewer>, request: Request) -> Response {
    let path = request.uri().path();
    tracing::debug!(path = %path, "No route");
    let html = state.error_page("Página não encontrada.", path, &viewer);
    (StatusCode::NOT_FOUND, html).into_response()
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(public::home))
        .route("/posts/{id}", get(public::post_detail))
        .route("/admin/signin", get(auth::signin_page).post(auth::signin))
        .route("/admin/signup", get(auth::signup_page).post(auth::signup))
        .route("/admin/signout", post(auth::signout))
        .route("/admin/dashboard", get(posts::dashboard))
        .route("/admin/create", get(posts::create_page).post(posts::create))
        .route("/admin/edit/{id}", get(posts::edit_page).post(posts::update))
        .route("/admin/posts/{id}/delete", post(posts::delete))
        .nest("/admin/teachers", users::router(Section::Teachers))
        .nest("/admin/students", users::router(Section::Students))
        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_session,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
