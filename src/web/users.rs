//! Teacher and student management
//!
//! Both sections share these handlers; the [`Section`] extension set on each
//! nested router picks the role, the wording and the URLs.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use serde::Serialize;
use tera::Context as TeraContext;

use crate::models::{User, UserRole};
use crate::services::validation::{validate_new_user, validate_user_update};
use crate::services::{ListController, RoleGuard, UserForm, UserListing};
use crate::web::views::{Pager, RoleOption, UserView};
use crate::web::{unless_expired, AppState, Notice, NoticeQuery, PageQuery, Viewer, WebError};

/// Roles a managed user can be given
const ASSIGNABLE_ROLES: [UserRole; 2] = [UserRole::Teacher, UserRole::Student];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Teachers,
    Students,
}

/// Section wording as templates see it
#[derive(Debug, Clone, Serialize)]
struct SectionView {
    slug: &'static str,
    title: &'static str,
    singular: &'static str,
}

impl Section {
    pub fn role(self) -> UserRole {
        match self {
            Section::Teachers => UserRole::Teacher,
            Section::Students => UserRole::Student,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Section::Teachers => "teachers",
            Section::Students => "students",
        }
    }

    pub fn list_url(self) -> String {
        format!("/admin/{}", self.slug())
    }

    fn view(self) -> SectionView {
        let (title, singular) = match self {
            Section::Teachers => ("Professores", "professor"),
            Section::Students => ("Alunos", "aluno"),
        };
        SectionView {
            slug: self.slug(),
            title,
            singular,
        }
    }

    /// The singular noun, capitalized, as it opens a sentence
    fn noun(self) -> &'static str {
        match self {
            Section::Teachers => "Professor",
            Section::Students => "Aluno",
        }
    }

    fn list_error(self) -> &'static str {
        match self {
            Section::Teachers => "Erro ao carregar professores.",
            Section::Students => "Erro ao carregar alunos.",
        }
    }

    fn load_error(self) -> &'static str {
        match self {
            Section::Teachers => "Erro ao buscar dados do professor.",
            Section::Students => "Erro ao buscar dados do aluno.",
        }
    }

    fn delete_error(self) -> &'static str {
        match self {
            Section::Teachers => "Erro ao excluir professor.",
            Section::Students => "Erro ao excluir aluno.",
        }
    }

    fn create_heading(self) -> &'static str {
        match self {
            Section::Teachers => "Cadastrar Novo Professor",
            Section::Students => "Cadastrar Novo Aluno",
        }
    }

    fn edit_heading(self) -> &'static str {
        match self {
            Section::Teachers => "Editar Professor",
            Section::Students => "Editar Aluno",
        }
    }
}

/// Routes of one section, to be nested under `/admin/{slug}`
pub fn router(section: Section) -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/create", get(create_page).post(create))
        .route("/edit/{id}", get(edit_page).post(update))
        .route("/{id}/delete", post(delete))
        .layer(Extension(section))
}

struct FormPage<'a> {
    section: Section,
    editing: Option<&'a str>,
    name: &'a str,
    email: &'a str,
    app_role: UserRole,
    error: Option<String>,
}

impl FormPage<'_> {
    fn context(&self) -> TeraContext {
        let section = self.section;
        let mut context = TeraContext::new();
        context.insert("section", &section.view());
        match self.editing {
            Some(id) => {
                context.insert("heading", section.edit_heading());
                context.insert("action", &format!("{}/edit/{}", section.list_url(), urlencoding::encode(id)));
            }
            None => {
                context.insert("heading", section.create_heading());
                context.insert("action", &format!("{}/create", section.list_url()));
            }
        }
        context.insert("editing", &self.editing.is_some());
        context.insert("name", self.name);
        context.insert("email", self.email);
        context.insert("app_role", self.app_role.as_str());
        let options: Vec<RoleOption> = ASSIGNABLE_ROLES.into_iter().map(RoleOption::from).collect();
        context.insert("role_options", &options);
        context.insert("error", &self.error);
        context
    }
}

/// Role picked on the edit form; anything not assignable keeps the section's
fn chosen_role(form: &UserForm, section: Section) -> UserRole {
    form.app_role
        .as_deref()
        .and_then(|r| r.parse::<UserRole>().ok())
        .filter(|r| ASSIGNABLE_ROLES.contains(r))
        .unwrap_or(section.role())
}

/// GET /admin/{section}
pub async fn list(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Extension(section): Extension<Section>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PageQuery>,
    Query(notice): Query<NoticeQuery>,
) -> Result<Response, WebError> {
    viewer.require(&RoleGuard::staff())?;

    let source = UserListing::new(state.users.clone(), viewer.token(), &[section.role()]);
    let mut list = ListController::new(source, state.config.pagination.users_per_page);
    if let Err(e) = list.fetch(query.page()).await {
        unless_expired(e)?;
    }

    let mut context = TeraContext::new();
    context.insert("section", &section.view());
    context.insert("error", &list.error().map(|_| section.list_error()));
    context.insert("pager", &Pager::new(&list, &section.list_url()));
    let users: Vec<UserView> = list.items().iter().map(UserView::from).collect();
    context.insert("users", &users);

    let html = state.render("users.html", &context, uri.path(), &viewer, notice.into_notice())?;
    Ok(html.into_response())
}

/// GET /admin/{section}/create
pub async fn create_page(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Extension(section): Extension<Section>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, WebError> {
    viewer.require(&RoleGuard::staff())?;
    let page = FormPage {
        section,
        editing: None,
        name: "",
        email: "",
        app_role: section.role(),
        error: None,
    };
    let html = state.render("user_form.html", &page.context(), uri.path(), &viewer, None)?;
    Ok(html.into_response())
}

/// POST /admin/{section}/create
pub async fn create(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Extension(section): Extension<Section>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<UserForm>,
) -> Result<Response, WebError> {
    viewer.require(&RoleGuard::staff())?;

    let (error, notice) = match validate_new_user(&form, section.role()) {
        Err(e) => (None, Some(Notice::warning(e.to_string()))),
        Ok(input) => match state.users.create(viewer.token(), &input).await {
            Ok(_) => {
                let notice = Notice::success(format!("{} cadastrado com sucesso!", section.noun()));
                return Ok(notice.redirect(&section.list_url()).into_response());
            }
            Err(e) => (Some(unless_expired(e)?.to_string()), None),
        },
    };

    let page = FormPage {
        section,
        editing: None,
        name: &form.name,
        email: &form.email,
        app_role: section.role(),
        error,
    };
    let html = state.render("user_form.html", &page.context(), uri.path(), &viewer, notice)?;
    Ok(html.into_response())
}

/// Load user `id`, bouncing to the section list when that fails
async fn load_user(state: &AppState, viewer: &Viewer, section: Section, id: &str) -> Result<User, WebError> {
    match state.users.get_by_id(viewer.token(), id).await {
        Ok(user) => Ok(user),
        Err(e) => {
            let e = unless_expired(e)?;
            tracing::warn!(user_id = %id, "Failed to load user: {}", e);
            let notice = Notice::alert(section.load_error());
            Err(WebError::Redirect(notice.url(&section.list_url())))
        }
    }
}

/// GET /admin/{section}/edit/{id}
pub async fn edit_page(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Extension(section): Extension<Section>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    viewer.require(&RoleGuard::staff())?;
    let user = load_user(&state, &viewer, section, &id).await?;

    let page = FormPage {
        section,
        editing: Some(&user.id),
        name: &user.name,
        email: &user.email,
        app_role: user
            .role()
            .filter(|r| ASSIGNABLE_ROLES.contains(r))
            .unwrap_or(section.role()),
        error: None,
    };
    let html = state.render("user_form.html", &page.context(), uri.path(), &viewer, None)?;
    Ok(html.into_response())
}

/// POST /admin/{section}/edit/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Extension(section): Extension<Section>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Form(form): Form<UserForm>,
) -> Result<Response, WebError> {
    viewer.require(&RoleGuard::staff())?;
    let role = chosen_role(&form, section);

    let (error, notice) = match validate_user_update(&form, role) {
        Err(e) => (None, Some(Notice::warning(e.to_string()))),
        Ok(input) => match state.users.update(viewer.token(), &id, &input).await {
            Ok(_) => {
                let notice = Notice::success(format!("{} atualizado com sucesso!", section.noun()));
                return Ok(notice.redirect(&section.list_url()).into_response());
            }
            Err(e) => (Some(unless_expired(e)?.to_string()), None),
        },
    };

    let page = FormPage {
        section,
        editing: Some(&id),
        name: &form.name,
        email: &form.email,
        app_role: role,
        error,
    };
    let html = state.render("user_form.html", &page.context(), uri.path(), &viewer, notice)?;
    Ok(html.into_response())
}

/// POST /admin/{section}/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Extension(section): Extension<Section>,
    Path(id): Path<String>,
) -> Result<Redirect, WebError> {
    viewer.require(&RoleGuard::staff())?;

    let notice = match state.users.delete(viewer.token(), &id).await {
        Ok(()) => Notice::success(format!("{} removido com sucesso!", section.noun())),
        Err(e) => {
            let e = unless_expired(e)?;
            tracing::warn!(user_id = %id, "Failed to delete user: {}", e);
            Notice::alert(section.delete_error())
        }
    };
    Ok(notice.redirect(&section.list_url()))
}
