//! Configuration management
//!
//! This module handles loading and parsing configuration for the EducaMais front-end.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// REST backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Auth provider configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session cache configuration
    #[serde(default)]
    pub session_cache: SessionCacheConfig,
    /// Page sizes
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// REST backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the REST API (no trailing slash)
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl BackendConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Auth provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path of the auth provider on the backend
    #[serde(default = "default_auth_base_path")]
    pub base_path: String,
    /// Name of the session cookie shared with the auth provider
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Max-Age of the session cookie we set after sign-in
    #[serde(default = "default_cookie_max_age")]
    pub cookie_max_age_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_path: default_auth_base_path(),
            cookie_name: default_cookie_name(),
            cookie_max_age_seconds: default_cookie_max_age(),
        }
    }
}

fn default_auth_base_path() -> String {
    "/api/auth".to_string()
}

fn default_cookie_name() -> String {
    "better-auth.session_token".to_string()
}

fn default_cookie_max_age() -> u64 {
    7 * 24 * 60 * 60 // 7 days
}

/// Session cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCacheConfig {
    /// How long a resolved session stays cached
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached sessions
    #[serde(default = "default_session_capacity")]
    pub max_capacity: u64,
}

impl Default for SessionCacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
            max_capacity: default_session_capacity(),
        }
    }
}

fn default_session_ttl() -> u64 {
    30
}

fn default_session_capacity() -> u64 {
    10_000
}

/// Page sizes per screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Posts per page on the home page and dashboard
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: u32,
    /// Users per page on the teacher and student lists
    #[serde(default = "default_users_per_page")]
    pub users_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            posts_per_page: default_posts_per_page(),
            users_per_page: default_users_per_page(),
        }
    }
}

fn default_posts_per_page() -> u32 {
    5
}

fn default_users_per_page() -> u32 {
    10
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - EDUCAMAIS_SERVER_HOST
    /// - EDUCAMAIS_SERVER_PORT
    /// - EDUCAMAIS_BACKEND_URL
    /// - EDUCAMAIS_BACKEND_TIMEOUT_SECONDS
    /// - EDUCAMAIS_AUTH_BASE_PATH
    /// - EDUCAMAIS_AUTH_COOKIE_NAME
    /// - EDUCAMAIS_SESSION_CACHE_TTL_SECONDS
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the rest of the application cannot work with
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "backend.base_url must be an http(s) URL, got '{}'",
                self.backend.base_url
            )));
        }
        if self.pagination.posts_per_page == 0 || self.pagination.users_per_page == 0 {
            return Err(ConfigError::ValidationError(
                "page sizes must be greater than zero".to_string(),
            ));
        }
        if self.auth.cookie_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.cookie_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("EDUCAMAIS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("EDUCAMAIS_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(url) = std::env::var("EDUCAMAIS_BACKEND_URL") {
            self.backend.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(timeout) = std::env::var("EDUCAMAIS_BACKEND_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.backend.timeout_seconds = timeout;
            }
        }

        if let Ok(base_path) = std::env::var("EDUCAMAIS_AUTH_BASE_PATH") {
            self.auth.base_path = base_path;
        }
        if let Ok(cookie_name) = std::env::var("EDUCAMAIS_AUTH_COOKIE_NAME") {
            self.auth.cookie_name = cookie_name;
        }

        if let Ok(ttl) = std::env::var("EDUCAMAIS_SESSION_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.session_cache.ttl_seconds = ttl;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
