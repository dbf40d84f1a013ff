// crates/backend-lib/src/error.rs

//! Central error type for signing, hashing and session operations.
use thiserror::Error;

/// Errors surfaced by the provider and the session repository
#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Signing primitive unavailable: {0}")]
    SigningUnavailable(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Session repository is inactive")]
    RepositoryInactive,

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Rate limit {0} cannot be applied")]
    RateLimitOutOfRange(f64),

    #[error("Session creation rate limit exceeded")]
    RateLimited,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Shorthand used throughout the crate
pub type Result<T> = std::result::Result<T, SecurityError>;

impl SecurityError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SecurityError::InvalidArgument(_) => "ARG_001",
            SecurityError::SigningUnavailable(_) => "SIGN_001",
            SecurityError::DecryptionFailed => "CRYPT_001",
            SecurityError::RepositoryInactive => "SESS_001",
            SecurityError::UnknownSession(_) => "SESS_002",
            SecurityError::RateLimitOutOfRange(_) => "RATE_001",
            SecurityError::RateLimited => "RATE_002",
            SecurityError::Config(_) => "CFG_001",
        }
    }

    /// Whether the process should stop instead of handling this per call.
    ///
    /// A missing digest or MAC primitive will not fix itself on retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SecurityError::SigningUnavailable(_))
    }

    /// Get a sanitized message suitable for returning to untrusted callers
    pub fn sanitized_message(&self) -> String {
        match self {
            SecurityError::InvalidArgument(_) => "Invalid input provided".to_string(),
            SecurityError::SigningUnavailable(_) | SecurityError::Config(_) => {
                "An internal server error occurred".to_string()
            },
            SecurityError::DecryptionFailed => "Invalid token".to_string(),
            SecurityError::RepositoryInactive => {
                "Sessions are not being accepted right now".to_string()
            },
            SecurityError::UnknownSession(_) => "Session not found".to_string(),
            SecurityError::RateLimitOutOfRange(_) => "Invalid rate limit".to_string(),
            SecurityError::RateLimited => "Rate limit exceeded, please try again later".to_string(),
        }
    }
}

impl From<figment::Error> for SecurityError {
    fn from(err: figment::Error) -> Self {
        SecurityError::Config(err.to_string())
    }
}
