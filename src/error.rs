use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Main error type for the Paloma dispatch service.
///
/// Per-recipient delivery failures are deliberately NOT represented here:
/// they are counted outcomes, never errors, and must not abort a job.
#[derive(Debug)]
pub enum PalomaError {
    /// Configuration or CLI argument errors
    Config(String),

    /// Recipient enumeration failed; fatal to a job before any batch runs
    RecipientFetch(String),

    /// API asked about a broadcast we are not tracking
    JobNotFound(u64),

    /// API action does not apply to the job in its current state
    InvalidJobState(String),

    /// System I/O errors
    Io(std::io::Error),

    /// JSON serialization/deserialization errors
    Serialization(serde_json::Error),

    /// Internal lock poisoning or concurrency errors
    Concurrency(String),
}

impl fmt::Display for PalomaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PalomaError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PalomaError::RecipientFetch(msg) => write!(f, "Recipient fetch error: {}", msg),
            PalomaError::JobNotFound(id) => write!(f, "Unknown broadcast job: {}", id),
            PalomaError::InvalidJobState(msg) => write!(f, "Invalid job state: {}", msg),
            PalomaError::Io(err) => write!(f, "I/O error: {}", err),
            PalomaError::Serialization(err) => write!(f, "Serialization error: {}", err),
            PalomaError::Concurrency(msg) => write!(f, "Concurrency error: {}", msg),
        }
    }
}

impl std::error::Error for PalomaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PalomaError::Io(err) => Some(err),
            PalomaError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

// Convenient type alias for Results using our error type
pub type Result<T> = std::result::Result<T, PalomaError>;

// Axum IntoResponse implementation for HTTP error responses
impl IntoResponse for PalomaError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = json!({
            "error": {
                "code": status_code.as_u16(),
                "message": self.to_string(),
                "type": self.error_type(),
            }
        });
        (status_code, Json(error_response)).into_response()
    }
}

impl PalomaError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PalomaError::Config(_) => StatusCode::BAD_REQUEST,
            PalomaError::RecipientFetch(_) => StatusCode::NOT_FOUND,
            PalomaError::JobNotFound(_) => StatusCode::NOT_FOUND,
            PalomaError::InvalidJobState(_) => StatusCode::CONFLICT,
            PalomaError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PalomaError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PalomaError::Concurrency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            PalomaError::Config(_) => "configuration_error",
            PalomaError::RecipientFetch(_) => "recipient_fetch_error",
            PalomaError::JobNotFound(_) => "job_not_found",
            PalomaError::InvalidJobState(_) => "invalid_job_state",
            PalomaError::Io(_) => "io_error",
            PalomaError::Serialization(_) => "serialization_error",
            PalomaError::Concurrency(_) => "concurrency_error",
        }
    }
}

// Conversions from common error types
impl From<std::io::Error> for PalomaError {
    fn from(err: std::io::Error) -> Self {
        PalomaError::Io(err)
    }
}

impl From<serde_json::Error> for PalomaError {
    fn from(err: serde_json::Error) -> Self {
        PalomaError::Serialization(err)
    }
}

// Helper macros for common error construction patterns
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::PalomaError::Config($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::PalomaError::Config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! recipient_fetch_error {
    ($msg:expr) => {
        $crate::error::PalomaError::RecipientFetch($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::PalomaError::RecipientFetch(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! concurrency_error {
    ($msg:expr) => {
        $crate::error::PalomaError::Concurrency($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::PalomaError::Concurrency(format!($fmt, $($arg)*))
    };
}
