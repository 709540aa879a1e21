//! Role guard
//!
//! Decides whether a page may render for the current session.
//!
//! # Decisions
//! - `Pending` session: wait, no redirect while the session is loading
//! - anonymous, or a role outside the allow-list: redirect
//! - otherwise: allow, handing back the user

use crate::models::{SessionState, SessionUser, UserRole};

/// Where guarded visitors are sent by default
pub const DEFAULT_REDIRECT: &str = "/";

/// Path prefixes that require a session cookie at all
pub const PROTECTED_PREFIXES: [&str; 6] = [
    "/admin/dashboard",
    "/admin/teachers",
    "/admin/students",
    "/admin/create",
    "/admin/edit",
    "/admin/posts",
];

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Session still resolving; render nothing yet
    Wait,
    Allow(SessionUser),
    Redirect(String),
}

/// Allow-list of roles for one page
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Vec<UserRole>,
    redirect: String,
}

impl RoleGuard {
    pub fn new(allowed: &[UserRole]) -> Self {
        Self {
            allowed: allowed.to_vec(),
            redirect: DEFAULT_REDIRECT.to_string(),
        }
    }

    /// Guard for the staff area (ADMIN and TEACHER)
    pub fn staff() -> Self {
        Self::new(&UserRole::STAFF)
    }

    pub fn allows(&self, role: UserRole) -> bool {
        self.allowed.contains(&role)
    }

    pub fn check(&self, session: &SessionState) -> GuardDecision {
        match session {
            SessionState::Pending => GuardDecision::Wait,
            SessionState::Authenticated(user) if user.app_role.is_some_and(|r| self.allows(r)) => {
                GuardDecision::Allow(user.clone())
            }
            SessionState::Authenticated(user) => {
                tracing::warn!(user_id = %user.id, role = ?user.app_role, "Role not allowed, redirecting");
                GuardDecision::Redirect(self.redirect.clone())
            }
            SessionState::Anonymous => GuardDecision::Redirect(self.redirect.clone()),
        }
    }
}

/// Whether `path` sits under one of the [`PROTECTED_PREFIXES`], matching whole segments
pub fn is_protected_path(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}
