//! User service
//!
//! Typed client for the `/users` endpoints. Listing by role normalizes
//! responses that lack a pagination block, so callers always get a [`Page`].

use std::sync::Arc;

use reqwest::Method;

use crate::models::{CreateUserInput, DataEnvelope, ListEnvelope, ListParams, Page, UpdateUserInput, User, UserRole};
use crate::services::error::{ErrorText, ServiceError};
use crate::services::http::ApiClient;

const CREATE: ErrorText = ErrorText::new(
    "Erro ao criar usuário",
    "Ocorreu um erro desconhecido ao criar usuário.",
);
const UPDATE: ErrorText = ErrorText::new(
    "Erro ao atualizar usuário",
    "Ocorreu um erro desconhecido ao atualizar usuário.",
);
const DELETE: ErrorText = ErrorText::new(
    "Erro ao deletar usuário",
    "Ocorreu um erro desconhecido ao deletar usuário.",
);
const GET: ErrorText = ErrorText::new(
    "Erro ao buscar usuário",
    "Ocorreu um erro desconhecido ao buscar usuário.",
);
const LIST: ErrorText = ErrorText::new(
    "Erro ao buscar usuários",
    "Ocorreu um erro desconhecido ao buscar usuários.",
);

/// Client for user resources
#[derive(Debug, Clone)]
pub struct UserService {
    client: Arc<ApiClient>,
}

impl UserService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn create(&self, session: Option<&str>, input: &CreateUserInput) -> Result<User, ServiceError> {
        let request = self.client.request(Method::POST, "/users", session).json(input);
        let envelope: DataEnvelope<User> = self.client.send_json(request, CREATE).await?;
        tracing::info!(user_id = %envelope.data.id, role = %input.app_role, "User created");
        Ok(envelope.data)
    }

    pub async fn update(
        &self,
        session: Option<&str>,
        id: &str,
        input: &UpdateUserInput,
    ) -> Result<User, ServiceError> {
        let request = self
            .client
            .request(Method::PUT, &user_path(id), session)
            .json(input);
        let envelope: DataEnvelope<User> = self.client.send_json(request, UPDATE).await?;
        tracing::info!(user_id = %id, "User updated");
        Ok(envelope.data)
    }

    pub async fn delete(&self, session: Option<&str>, id: &str) -> Result<(), ServiceError> {
        let request = self.client.request(Method::DELETE, &user_path(id), session);
        self.client.send_empty(request, DELETE).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, session: Option<&str>, id: &str) -> Result<User, ServiceError> {
        let request = self.client.request(Method::GET, &user_path(id), session);
        let envelope: DataEnvelope<User> = self.client.send_json(request, GET).await?;
        Ok(envelope.data)
    }

    /// Users holding any of `roles`, one `role` query pair per role
    pub async fn list_by_role(
        &self,
        session: Option<&str>,
        roles: &[UserRole],
        params: ListParams,
    ) -> Result<Page<User>, ServiceError> {
        let role_pairs: Vec<(&str, &str)> = roles.iter().map(|r| ("role", r.as_str())).collect();
        let request = self
            .client
            .request(Method::GET, "/users", session)
            .query(&role_pairs)
            .query(&params);
        let envelope: ListEnvelope<User> = self.client.send_json(request, LIST).await?;
        Ok(envelope.into_page(&params))
    }
}

fn user_path(id: &str) -> String {
    format!("/users/{}", urlencoding::encode(id))
}
