//! Paginated list controller
//!
//! Keeps the state behind every paginated screen: current page, total pages,
//! the items on display and the last error. Items come from a [`PageSource`],
//! which knows the endpoint and the filter (all posts, a search, one author's
//! posts, users by role).
//!
//! A failed fetch keeps whatever was on display and only records the error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{ListParams, Page, Post, User, UserRole};
use crate::services::error::ServiceError;
use crate::services::post::PostService;
use crate::services::user::UserService;

/// Something that can produce one page of items
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, params: ListParams) -> Result<Page<T>, ServiceError>;
}

/// Which posts a [`PostListing`] shows
#[derive(Debug, Clone, PartialEq)]
pub enum PostFilter {
    All,
    Search(String),
    ByAuthor(String),
}

/// Posts, optionally filtered by search term or author
pub struct PostListing {
    service: Arc<PostService>,
    session: Option<String>,
    filter: PostFilter,
}

impl PostListing {
    pub fn new(service: Arc<PostService>, session: Option<&str>, filter: PostFilter) -> Self {
        Self {
            service,
            session: session.map(String::from),
            filter,
        }
    }
}

#[async_trait]
impl PageSource<Post> for PostListing {
    async fn fetch_page(&self, params: ListParams) -> Result<Page<Post>, ServiceError> {
        let session = self.session.as_deref();
        match &self.filter {
            PostFilter::All => self.service.list(session, params).await,
            PostFilter::Search(term) => self.service.search(session, term, params).await,
            PostFilter::ByAuthor(user_id) => self.service.list_by_author(session, user_id, params).await,
        }
    }
}

/// Users holding any of a set of roles
pub struct UserListing {
    service: Arc<UserService>,
    session: Option<String>,
    roles: Vec<UserRole>,
}

impl UserListing {
    pub fn new(service: Arc<UserService>, session: Option<&str>, roles: &[UserRole]) -> Self {
        Self {
            service,
            session: session.map(String::from),
            roles: roles.to_vec(),
        }
    }
}

#[async_trait]
impl PageSource<User> for UserListing {
    async fn fetch_page(&self, params: ListParams) -> Result<Page<User>, ServiceError> {
        self.service
            .list_by_role(self.session.as_deref(), &self.roles, params)
            .await
    }
}

/// State of one paginated screen
pub struct ListController<T> {
    source: Box<dyn PageSource<T>>,
    page_size: u32,
    current_page: u32,
    total_pages: u32,
    items: Vec<T>,
    error: Option<String>,
}

impl<T: Send> ListController<T> {
    pub fn new(source: impl PageSource<T> + 'static, page_size: u32) -> Self {
        Self {
            source: Box::new(source),
            page_size: page_size.max(1),
            current_page: 1,
            total_pages: 1,
            items: Vec::new(),
            error: None,
        }
    }

    /// Load `page`
    ///
    /// A page past the end (a stale `?page=` link, or rows deleted since)
    /// loads the last page instead. On failure the displayed items and
    /// position stay as they were; the error is recorded for display and
    /// also returned so callers can react to an expired session.
    pub async fn fetch(&mut self, page: u32) -> Result<(), ServiceError> {
        let mut params = ListParams::new(page, self.page_size);
        let mut result = self.load(params).await?;
        if params.page > result.total_pages() {
            params = ListParams::new(result.total_pages(), self.page_size);
            result = self.load(params).await?;
        }

        self.total_pages = result.total_pages();
        self.current_page = params.page.min(self.total_pages);
        self.items = result.items;
        self.error = None;
        Ok(())
    }

    async fn load(&mut self, params: ListParams) -> Result<Page<T>, ServiceError> {
        self.source.fetch_page(params).await.map_err(|e| {
            tracing::warn!(page = params.page, "List fetch failed: {}", e);
            self.error = Some(e.to_string());
            e
        })
    }

    /// Move one page forward; a no-op on the last page
    pub async fn next(&mut self) -> Result<(), ServiceError> {
        match self.next_page() {
            Some(page) => self.fetch(page).await,
            None => Ok(()),
        }
    }

    /// Move one page back; a no-op on the first page
    pub async fn previous(&mut self) -> Result<(), ServiceError> {
        match self.previous_page() {
            Some(page) => self.fetch(page).await,
            None => Ok(()),
        }
    }

    /// Drop items locally, e.g. after a successful delete; returns how many went
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !pred(item));
        before - self.items.len()
    }

    pub fn next_page(&self) -> Option<u32> {
        (self.current_page < self.total_pages).then(|| self.current_page + 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
