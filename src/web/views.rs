//! Template view models

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Post, SessionUser, User, UserRole};
use crate::services::ListController;

/// Characters of body shown on list cards
const EXCERPT_CHARS: usize = 200;

fn format_date(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(|d| d.format("%d/%m/%Y").to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub author: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Whether the viewer may edit it
    pub editable: bool,
}

impl PostView {
    pub fn new(post: &Post, viewer: Option<&SessionUser>) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            excerpt: post.excerpt(EXCERPT_CHARS),
            body: post.body.clone(),
            author: post.author_name().to_string(),
            created_at: format_date(post.created_at),
            updated_at: format_date(post.updated_at),
            editable: viewer.is_some_and(|u| u.can_edit(&post.author_id.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role_label: Option<String>,
    pub created_at: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.display_name().to_string(),
            email: user.email.clone(),
            role_label: user.role().map(|r| r.label().to_string()),
            created_at: format_date(user.created_at),
        }
    }
}

/// Option of a role `<select>`
#[derive(Debug, Clone, Serialize)]
pub struct RoleOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl From<UserRole> for RoleOption {
    fn from(role: UserRole) -> Self {
        Self {
            value: role.as_str(),
            label: role.label(),
        }
    }
}

/// Pagination widget: "Página X de Y" with previous/next links
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pager {
    pub current: u32,
    pub total: u32,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pager {
    /// Pager for `list`; `base` is the page URL, optionally with a query already
    pub fn new<T: Send>(list: &ListController<T>, base: &str) -> Self {
        let link = |page: u32| {
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{}{}page={}", base, separator, page)
        };
        Self {
            current: list.current_page(),
            total: list.total_pages(),
            previous_url: list.previous_page().map(link),
            next_url: list.next_page().map(link),
        }
    }
}
