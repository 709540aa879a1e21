//! Session resolver
//!
//! Turns the session cookie of an incoming request into a [`SessionState`].
//! Lookups go to the auth provider and are cached per token for a short TTL,
//! negative answers included, so a page with several guarded fragments costs
//! one provider round trip.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::SessionCacheConfig;
use crate::models::{SessionState, SessionUser};
use crate::services::auth::AuthService;

/// Cached session lookups keyed by token
pub struct SessionResolver {
    auth: Arc<AuthService>,
    cache: Cache<String, Option<SessionUser>>,
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl SessionResolver {
    pub fn new(auth: Arc<AuthService>, config: &SessionCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_seconds))
            .build();
        Self { auth, cache }
    }

    /// Resolve the session behind `token`
    ///
    /// Provider failures resolve to [`SessionState::Anonymous`] and are not cached.
    pub async fn resolve(&self, token: Option<&str>) -> SessionState {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return SessionState::Anonymous;
        };

        if let Some(cached) = self.cache.get(token).await {
            return into_state(cached);
        }

        match self.auth.get_session(token).await {
            Ok(user) => {
                self.cache.insert(token.to_string(), user.clone()).await;
                into_state(user)
            }
            Err(e) => {
                tracing::warn!("Session lookup failed: {}", e);
                SessionState::Anonymous
            }
        }
    }

    /// Forget whatever is cached for `token`
    pub async fn invalidate(&self, token: &str) {
        self.cache.invalidate(token).await;
        tracing::debug!("Session cache entry invalidated");
    }
}

fn into_state(user: Option<SessionUser>) -> SessionState {
    match user {
        Some(user) => SessionState::Authenticated(user),
        None => SessionState::Anonymous,
    }
}
