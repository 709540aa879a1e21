//! User model
//!
//! Users as returned by the `/users` endpoints, their business role and the
//! request bodies for creating and updating them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Technical role the auth provider expects on accounts created by staff.
pub const PROVIDER_USER_ROLE: &str = "user";

/// A user account as exposed by the backend.
///
/// The backend reports the business role either as `appRole` or, on older
/// deployments, directly as `role`. [`User::role`] resolves both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Business role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_role: Option<UserRole>,
    /// Technical role (`"user"`, `"admin"`) or, on older backends, the business role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Business role of the account, if the backend reported one
    pub fn role(&self) -> Option<UserRole> {
        self.app_role
            .or_else(|| self.role.as_deref().and_then(|r| r.parse().ok()))
    }

    /// Name to greet the user with; falls back to the email
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Business role governing which pages and actions are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Administrator - manages everything
    Admin,
    /// Teacher - writes posts, manages students and teachers
    Teacher,
    /// Student - reads only
    Student,
}

impl UserRole {
    /// All roles, in display order
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Teacher, UserRole::Student];

    /// Roles allowed into the staff area
    pub const STAFF: [UserRole; 2] = [UserRole::Admin, UserRole::Teacher];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Teacher => "TEACHER",
            UserRole::Student => "STUDENT",
        }
    }

    /// Portuguese label used by the header badge
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrador",
            UserRole::Teacher => "Professor",
            UserRole::Student => "Aluno",
        }
    }

    /// Whether the role may enter the staff area
    pub fn is_staff(&self) -> bool {
        Self::STAFF.contains(self)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "TEACHER" => Ok(UserRole::Teacher),
            "STUDENT" => Ok(UserRole::Student),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Body of `POST /users`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Technical role for the auth provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Business role (TEACHER or STUDENT)
    pub app_role: UserRole,
}

/// Body of `PUT /users/:id`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_role: Option<UserRole>,
}
