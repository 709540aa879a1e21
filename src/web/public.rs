//! Public pages: post listing with search, post detail

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use tera::Context as TeraContext;

use crate::services::{ListController, PostFilter, PostListing};
use crate::web::views::{Pager, PostView};
use crate::web::{unless_expired, AppState, NoticeQuery, Viewer, WebError};

/// Shown instead of the backend's message when the home list fails
const HOME_LIST_ERROR: &str = "Erro de conexão com o servidor.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
}

/// GET / - paginated posts, or search results when `search` is set
///
/// A search form submission carries no page, so a new search starts on page 1.
pub async fn home(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<HomeQuery>,
    Query(notice): Query<NoticeQuery>,
) -> Result<Response, WebError> {
    let search = query.search.as_deref().map(str::trim).unwrap_or_default().to_string();
    let (filter, base) = if search.is_empty() {
        (PostFilter::All, "/".to_string())
    } else {
        (
            PostFilter::Search(search.clone()),
            format!("/?search={}", urlencoding::encode(&search)),
        )
    };

    let source = PostListing::new(state.posts.clone(), viewer.token(), filter);
    let mut list = ListController::new(source, state.config.pagination.posts_per_page);
    if let Err(e) = list.fetch(query.page.unwrap_or(1).max(1)).await {
        unless_expired(e)?;
    }

    let mut context = TeraContext::new();
    context.insert("search", &search);
    context.insert("error", &list.error().map(|_| HOME_LIST_ERROR));
    context.insert("pager", &Pager::new(&list, &base));
    let posts: Vec<PostView> = list.items().iter().map(|p| PostView::new(p, viewer.user())).collect();
    context.insert("posts", &posts);

    let html = state.render("home.html", &context, uri.path(), &viewer, notice.into_notice())?;
    Ok(html.into_response())
}

/// GET /posts/{id}
pub async fn post_detail(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Query(notice): Query<NoticeQuery>,
) -> Result<Response, WebError> {
    let mut context = TeraContext::new();
    let mut status = StatusCode::OK;

    match id.parse::<i64>() {
        Ok(id) => match state.posts.get_by_id(viewer.token(), id).await {
            Ok(post) => {
                context.insert("post", &PostView::new(&post, viewer.user()));
                context.insert("error", &None::<String>);
            }
            Err(e) => {
                let e = unless_expired(e)?;
                if e.is_not_found() {
                    status = StatusCode::NOT_FOUND;
                }
                context.insert("post", &None::<PostView>);
                context.insert("error", &e.to_string());
            }
        },
        Err(_) => {
            status = StatusCode::NOT_FOUND;
            context.insert("post", &None::<PostView>);
            context.insert("error", "Post não encontrado.");
        }
    }

    let html = state.render("post.html", &context, uri.path(), &viewer, notice.into_notice())?;
    Ok((status, html).into_response())
}
