//! Post service
//!
//! Typed client for the `/posts` endpoints:
//! - create, update, delete, get by id
//! - paginated listing, listing by author, search

use std::sync::Arc;

use reqwest::Method;

use crate::models::{CreatePostInput, DataEnvelope, ListEnvelope, ListParams, Page, Post, UpdatePostInput};
use crate::services::error::{ErrorText, ServiceError};
use crate::services::http::ApiClient;

const CREATE: ErrorText = ErrorText::new(
    "Erro ao criar o post",
    "Ocorreu um erro desconhecido ao criar o post.",
);
const UPDATE: ErrorText = ErrorText::new(
    "Erro ao atualizar o post",
    "Ocorreu um erro desconhecido ao atualizar o post.",
);
const DELETE: ErrorText = ErrorText::new(
    "Erro ao deletar o post",
    "Ocorreu um erro desconhecido ao deletar o post.",
);
const GET: ErrorText = ErrorText::new(
    "Erro ao buscar o post",
    "Ocorreu um erro desconhecido ao buscar o post.",
);
const LIST: ErrorText = ErrorText::new(
    "Erro ao buscar posts",
    "Ocorreu um erro desconhecido ao buscar posts.",
);
const LIST_BY_AUTHOR: ErrorText = ErrorText::new(
    "Erro ao buscar posts do autor",
    "Ocorreu um erro desconhecido ao buscar posts do autor.",
);

/// Client for post resources
#[derive(Debug, Clone)]
pub struct PostService {
    client: Arc<ApiClient>,
}

impl PostService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Create a post authored by the session's user
    pub async fn create(&self, session: Option<&str>, input: &CreatePostInput) -> Result<Post, ServiceError> {
        let request = self.client.request(Method::POST, "/posts", session).json(input);
        let envelope: DataEnvelope<Post> = self.client.send_json(request, CREATE).await?;
        tracing::info!(post_id = envelope.data.id, "Post created");
        Ok(envelope.data)
    }

    /// Update title and/or body of a post
    pub async fn update(
        &self,
        session: Option<&str>,
        id: i64,
        input: &UpdatePostInput,
    ) -> Result<Post, ServiceError> {
        let request = self
            .client
            .request(Method::PUT, &format!("/posts/{id}"), session)
            .json(input);
        let envelope: DataEnvelope<Post> = self.client.send_json(request, UPDATE).await?;
        tracing::info!(post_id = id, "Post updated");
        Ok(envelope.data)
    }

    pub async fn delete(&self, session: Option<&str>, id: i64) -> Result<(), ServiceError> {
        let request = self.client.request(Method::DELETE, &format!("/posts/{id}"), session);
        self.client.send_empty(request, DELETE).await?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, session: Option<&str>, id: i64) -> Result<Post, ServiceError> {
        let request = self.client.request(Method::GET, &format!("/posts/{id}"), session);
        let envelope: DataEnvelope<Post> = self.client.send_json(request, GET).await?;
        Ok(envelope.data)
    }

    /// All posts, newest first as ordered by the backend
    pub async fn list(&self, session: Option<&str>, params: ListParams) -> Result<Page<Post>, ServiceError> {
        let request = self
            .client
            .request(Method::GET, "/posts", session)
            .query(&params);
        self.fetch_page(request, params, LIST).await
    }

    /// Posts written by one user
    pub async fn list_by_author(
        &self,
        session: Option<&str>,
        user_id: &str,
        params: ListParams,
    ) -> Result<Page<Post>, ServiceError> {
        let path = format!("/posts/user/{}", urlencoding::encode(user_id));
        let request = self.client.request(Method::GET, &path, session).query(&params);
        self.fetch_page(request, params, LIST_BY_AUTHOR).await
    }

    /// Posts matching a search term
    pub async fn search(
        &self,
        session: Option<&str>,
        term: &str,
        params: ListParams,
    ) -> Result<Page<Post>, ServiceError> {
        let request = self
            .client
            .request(Method::GET, "/posts/search", session)
            .query(&[("search", term)])
            .query(&params);
        self.fetch_page(request, params, LIST).await
    }

    async fn fetch_page(
        &self,
        request: reqwest::RequestBuilder,
        params: ListParams,
        text: ErrorText,
    ) -> Result<Page<Post>, ServiceError> {
        let envelope: ListEnvelope<Post> = self.client.send_json(request, text).await?;
        Ok(envelope.into_page(&params))
    }
}
