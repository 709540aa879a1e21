//! Sign-in, sign-up and sign-out pages
//!
//! Validation failures come back as a warning notice on the same form;
//! rejections by the auth provider as an alert.

use axum::{
    extract::{OriginalUri, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use tera::Context as TeraContext;

use crate::services::validation::{validate_sign_in, validate_sign_up};
use crate::services::{SignInForm, SignUpForm};
use crate::web::middleware::{clear_session_cookie, session_cookie};
use crate::web::{AppState, Notice, NoticeQuery, Viewer, WebError};

const AFTER_SIGN_IN: &str = "/admin/dashboard";

fn signin_context(email: &str) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("email", email);
    context.insert("error", &None::<String>);
    context
}

fn signup_context(name: &str, email: &str) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("name", name);
    context.insert("email", email);
    context.insert("error", &None::<String>);
    context
}

/// Redirect into the staff area with a fresh session cookie
fn signed_in(state: &AppState, token: &str, notice: Notice) -> Response {
    let auth = &state.config.auth;
    let cookie = session_cookie(&auth.cookie_name, token, auth.cookie_max_age_seconds);
    ([(header::SET_COOKIE, cookie)], notice.redirect(AFTER_SIGN_IN)).into_response()
}

/// GET /admin/signin
pub async fn signin_page(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Query(notice): Query<NoticeQuery>,
) -> Result<Response, WebError> {
    let html = state.render("signin.html", &signin_context(""), uri.path(), &viewer, notice.into_notice())?;
    Ok(html.into_response())
}

/// POST /admin/signin
pub async fn signin(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<SignInForm>,
) -> Result<Response, WebError> {
    let email = form.email.trim();
    let rejection = match validate_sign_in(&form) {
        Err(e) => Notice::warning(e.to_string()),
        Ok(()) => match state.auth.sign_in_email(email, &form.password).await {
            Ok(token) => {
                state.sessions.invalidate(&token).await;
                return Ok(signed_in(&state, &token, Notice::success("Login realizado com sucesso!")));
            }
            Err(e) => Notice::alert(e.to_string()),
        },
    };

    let html = state.render("signin.html", &signin_context(email), uri.path(), &viewer, Some(rejection))?;
    Ok(html.into_response())
}

/// GET /admin/signup
pub async fn signup_page(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Query(notice): Query<NoticeQuery>,
) -> Result<Response, WebError> {
    let html = state.render("signup.html", &signup_context("", ""), uri.path(), &viewer, notice.into_notice())?;
    Ok(html.into_response())
}

/// POST /admin/signup
pub async fn signup(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<SignUpForm>,
) -> Result<Response, WebError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let rejection = match validate_sign_up(&form) {
        Err(e) => Notice::warning(e.to_string()),
        Ok(()) => match state.auth.sign_up_email(name, email, &form.password).await {
            Ok(token) => {
                state.sessions.invalidate(&token).await;
                return Ok(signed_in(&state, &token, Notice::success("Cadastro realizado com sucesso!")));
            }
            Err(e) => Notice::alert(e.to_string()),
        },
    };

    let context = signup_context(name, email);
    let html = state.render("signup.html", &context, uri.path(), &viewer, Some(rejection))?;
    Ok(html.into_response())
}

/// POST /admin/signout
///
/// The cookie is cleared even when the provider call fails.
pub async fn signout(State(state): State<AppState>, Extension(viewer): Extension<Viewer>) -> Response {
    if let Some(token) = viewer.token() {
        if let Err(e) = state.auth.sign_out(token).await {
            tracing::warn!("Sign-out failed: {}", e);
        }
        state.sessions.invalidate(token).await;
    }
    let cookie = clear_session_cookie(&state.config.auth.cookie_name);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}
