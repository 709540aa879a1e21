//! EducaMais - server-rendered front-end for a school blogging platform
//!
//! Public visitors browse and search posts; teachers and admins sign in to
//! manage posts, teachers and students. Data lives in a REST backend and
//! sessions in its auth provider, both reached over HTTP.

pub mod config;
pub mod models;
pub mod services;
pub mod theme;
pub mod web;

#[cfg(test)]
pub mod test_support;
