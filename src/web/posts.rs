//! Staff post pages: dashboard, create, edit, delete

use axum::{
    extract::{OriginalUri, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use tera::Context as TeraContext;

use crate::models::{Post, SessionUser, UpdatePostInput};
use crate::services::validation::validate_post;
use crate::services::{ListController, PostFilter, PostForm, PostListing, RoleGuard};
use crate::web::views::{Pager, PostView};
use crate::web::{unless_expired, AppState, Notice, NoticeQuery, PageQuery, Viewer, WebError};

const DASHBOARD: &str = "/admin/dashboard";

/// Blank or pre-filled post form
struct FormPage<'a> {
    heading: &'a str,
    action: String,
    submit_label: &'a str,
    titulo: &'a str,
    conteudo: &'a str,
    error: Option<String>,
}

impl FormPage<'_> {
    fn context(&self) -> TeraContext {
        let mut context = TeraContext::new();
        context.insert("heading", self.heading);
        context.insert("action", &self.action);
        context.insert("submit_label", self.submit_label);
        context.insert("titulo", self.titulo);
        context.insert("conteudo", self.conteudo);
        context.insert("error", &self.error);
        context
    }
}

fn create_form<'a>(titulo: &'a str, conteudo: &'a str, error: Option<String>) -> FormPage<'a> {
    FormPage {
        heading: "Criar Novo Post",
        action: "/admin/create".to_string(),
        submit_label: "Publicar",
        titulo,
        conteudo,
        error,
    }
}

fn edit_form<'a>(id: i64, titulo: &'a str, conteudo: &'a str, error: Option<String>) -> FormPage<'a> {
    FormPage {
        heading: "Editar Post",
        action: format!("/admin/edit/{}", id),
        submit_label: "Salvar alterações",
        titulo,
        conteudo,
        error,
    }
}

/// Load post `id` for editing by `user`
///
/// Sends the user back to the dashboard when the post is missing or not theirs.
async fn editable_post(state: &AppState, viewer: &Viewer, user: &SessionUser, id: &str) -> Result<Post, WebError> {
    let bounce = |notice: Notice| WebError::Redirect(notice.url(DASHBOARD));

    let id: i64 = id
        .parse()
        .map_err(|_| bounce(Notice::alert("Post não encontrado.")))?;
    let post = match state.posts.get_by_id(viewer.token(), id).await {
        Ok(post) => post,
        Err(e) => {
            let e = unless_expired(e)?;
            return Err(bounce(Notice::alert(e.to_string())));
        }
    };

    if !user.can_edit(&post.author_id.to_string()) {
        tracing::warn!(user_id = %user.id, post_id = post.id, "Change to someone else's post refused");
        return Err(bounce(Notice::warning("Você não tem permissão para alterar este post.")));
    }
    Ok(post)
}

/// GET /admin/dashboard - all posts for admins, own posts for teachers
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PageQuery>,
    Query(notice): Query<NoticeQuery>,
) -> Result<Response, WebError> {
    let user = viewer.require(&RoleGuard::staff())?;

    let filter = if user.is_admin() {
        PostFilter::All
    } else {
        PostFilter::ByAuthor(user.id.clone())
    };
    let source = PostListing::new(state.posts.clone(), viewer.token(), filter);
    let mut list = ListController::new(source, state.config.pagination.posts_per_page);
    if let Err(e) = list.fetch(query.page()).await {
        unless_expired(e)?;
    }

    let mut context = TeraContext::new();
    context.insert("greeting", user.display_name());
    context.insert("is_admin", &user.is_admin());
    context.insert("error", &list.error());
    context.insert("pager", &Pager::new(&list, DASHBOARD));
    let posts: Vec<PostView> = list.items().iter().map(|p| PostView::new(p, Some(&user))).collect();
    context.insert("posts", &posts);

    let html = state.render("dashboard.html", &context, uri.path(), &viewer, notice.into_notice())?;
    Ok(html.into_response())
}

/// GET /admin/create
pub async fn create_page(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Query(notice): Query<NoticeQuery>,
) -> Result<Response, WebError> {
    viewer.require(&RoleGuard::staff())?;
    let context = create_form("", "", None).context();
    let html = state.render("post_form.html", &context, uri.path(), &viewer, notice.into_notice())?;
    Ok(html.into_response())
}

/// POST /admin/create
pub async fn create(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<PostForm>,
) -> Result<Response, WebError> {
    viewer.require(&RoleGuard::staff())?;

    let (error, notice) = match validate_post(&form) {
        Err(e) => (None, Some(Notice::warning(e.to_string()))),
        Ok(input) => match state.posts.create(viewer.token(), &input).await {
            Ok(_) => {
                return Ok(Notice::success("Post criado com sucesso!").redirect(DASHBOARD).into_response());
            }
            Err(e) => (Some(unless_expired(e)?.to_string()), None),
        },
    };

    let context = create_form(&form.titulo, &form.conteudo, error).context();
    let html = state.render("post_form.html", &context, uri.path(), &viewer, notice)?;
    Ok(html.into_response())
}

/// GET /admin/edit/{id}
pub async fn edit_page(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Query(notice): Query<NoticeQuery>,
) -> Result<Response, WebError> {
    let user = viewer.require(&RoleGuard::staff())?;
    let post = editable_post(&state, &viewer, &user, &id).await?;

    let context = edit_form(post.id, &post.title, &post.body, None).context();
    let html = state.render("post_form.html", &context, uri.path(), &viewer, notice.into_notice())?;
    Ok(html.into_response())
}

/// POST /admin/edit/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Form(form): Form<PostForm>,
) -> Result<Response, WebError> {
    let user = viewer.require(&RoleGuard::staff())?;
    let post = editable_post(&state, &viewer, &user, &id).await?;

    let (error, notice) = match validate_post(&form) {
        Err(e) => (None, Some(Notice::warning(e.to_string()))),
        Ok(input) => match state
            .posts
            .update(viewer.token(), post.id, &UpdatePostInput::from(input))
            .await
        {
            Ok(_) => {
                return Ok(Notice::success("Post atualizado com sucesso!").redirect(DASHBOARD).into_response());
            }
            Err(e) => (Some(unless_expired(e)?.to_string()), None),
        },
    };

    let context = edit_form(post.id, &form.titulo, &form.conteudo, error).context();
    let html = state.render("post_form.html", &context, uri.path(), &viewer, notice)?;
    Ok(html.into_response())
}

/// POST /admin/posts/{id}/delete
///
/// Any staff member may delete a post; ownership only matters for edits.
pub async fn delete(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> Result<Redirect, WebError> {
    let user = viewer.require(&RoleGuard::staff())?;
    let Ok(id) = id.parse::<i64>() else {
        return Ok(Notice::alert("Post não encontrado.").redirect(DASHBOARD));
    };

    match state.posts.delete(viewer.token(), id).await {
        Ok(()) => {
            tracing::info!(user_id = %user.id, post_id = id, "Post deleted");
            Ok(Notice::success("Post excluído com sucesso!").redirect(DASHBOARD))
        }
        Err(e) => {
            let e = unless_expired(e)?;
            Ok(Notice::alert(e.to_string()).redirect(DASHBOARD))
        }
    }
}
