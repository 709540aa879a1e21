//! Data models
//!
//! This module contains the data structures exchanged with the EducaMais backend.
//! Models represent:
//! - Backend resources (Post, User)
//! - Auth provider sessions
//! - Pagination metadata and response envelopes
//! - Request bodies for create/update operations

mod pagination;
mod post;
mod session;
mod user;

pub use pagination::{DataEnvelope, ListEnvelope, ListParams, Page, Pagination};
pub use post::{Author, CreatePostInput, Post, UpdatePostInput};
pub use session::{SessionEnvelope, SessionState, SessionUser};
pub use user::{CreateUserInput, UpdateUserInput, User, UserRole, PROVIDER_USER_ROLE};
