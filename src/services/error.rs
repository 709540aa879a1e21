//! Service error type
//!
//! Every error's `Display` output is the message shown to the user.

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The backend rejected the session (401 or `SESSION_EXPIRED`)
    #[error("Sua sessão expirou. Faça login novamente.")]
    SessionExpired,

    /// No response at all (connection refused, timeout...)
    #[error("{0}")]
    Unreachable(String),

    /// The response body did not have the expected shape
    #[error("Resposta inválida do servidor: {0}")]
    Decode(String),

    /// Input rejected before any request was sent
    #[error("{0}")]
    Validation(String),
}

impl ServiceError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ServiceError::SessionExpired)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Api { status: 404, .. })
    }
}

/// User-facing messages of one backend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorText {
    /// Used when the backend rejects the request without a `message`
    pub rejected: &'static str,
    /// Used when no response arrives
    pub unreachable: &'static str,
}

impl ErrorText {
    pub const fn new(rejected: &'static str, unreachable: &'static str) -> Self {
        Self {
            rejected,
            unreachable,
        }
    }
}
