//! Services layer - backend access and page logic
//!
//! This module contains everything the pages need besides rendering:
//! - typed clients for the REST backend and the auth provider
//! - session resolution and role guards
//! - the paginated list controller
//! - form validation

pub mod auth;
pub mod error;
pub mod guard;
pub mod http;
pub mod listing;
pub mod post;
pub mod session;
pub mod user;
pub mod validation;

pub use auth::AuthService;
pub use error::{ErrorText, ServiceError};
pub use guard::{is_protected_path, GuardDecision, RoleGuard};
pub use http::ApiClient;
pub use listing::{ListController, PageSource, PostFilter, PostListing, UserListing};
pub use post::PostService;
pub use session::SessionResolver;
pub use user::UserService;
pub use validation::{PostForm, SignInForm, SignUpForm, UserForm};
