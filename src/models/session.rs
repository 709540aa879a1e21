//! Session model

use serde::{Deserialize, Serialize};

use super::UserRole;

/// Identity carried by an auth-provider session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Technical role assigned by the auth provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Business role; unknown values are treated as no role
    #[serde(
        default,
        deserialize_with = "lenient_role",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_role: Option<UserRole>,
}

impl SessionUser {
    /// Name to greet the user with; falls back to the email
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }

    pub fn is_admin(&self) -> bool {
        self.app_role == Some(UserRole::Admin)
    }

    /// Check if the user can edit a post written by `author_id`
    ///
    /// Admins can edit any post. Everyone else only their own.
    pub fn can_edit(&self, author_id: &str) -> bool {
        self.is_admin() || self.id == author_id
    }
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Option<UserRole>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.parse().ok()))
}

/// Body of the provider's `get-session` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SessionEnvelope {
    pub user: SessionUser,
}

/// Where the current request stands with respect to authentication.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// The session is still being resolved
    Pending,
    /// No session, or the provider rejected it
    Anonymous,
    /// A live session
    Authenticated(SessionUser),
}

impl SessionState {
    /// The signed-in user, if any
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}
