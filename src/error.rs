// src/error.rs

use std::fmt;

/// Global Application Error Enum.
/// Every failure of the quiz engine and the API client funnels through here.
#[derive(Debug)]
pub enum AppError {
    // Bad or missing quiz settings, invalid input
    Validation(String),

    // Transport failure (connection refused, timeout, broken body)
    Network(String),

    // Backend answered with a non-success status
    Service { status: u16, message: String },

    // Backend answered 503 (AI hints not configured or overloaded)
    ServiceUnavailable(String),

    // Hint cap reached, no request was sent
    HintUnavailable(String),

    // Local store failure
    Storage(String),

    // 401 that a refresh could not recover
    AuthError(String),

    // The quiz was already finalized in this run
    AlreadyFinalized,

    // The attempt was already acknowledged by the backend
    AlreadySubmitted(String),
}

/// Coarse discriminator used by callers to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Network,
    Service,
    Storage,
    Auth,
    State,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Network(_) => ErrorKind::Network,
            AppError::Service { .. }
            | AppError::ServiceUnavailable(_)
            | AppError::HintUnavailable(_) => ErrorKind::Service,
            AppError::Storage(_) => ErrorKind::Storage,
            AppError::AuthError(_) => ErrorKind::Auth,
            AppError::AlreadyFinalized | AppError::AlreadySubmitted(_) => ErrorKind::State,
        }
    }

    /// HTTP status carried by backend errors, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Service { status, .. } => Some(*status),
            AppError::ServiceUnavailable(_) => Some(503),
            AppError::AuthError(_) => Some(401),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "invalid input: {}", msg),
            AppError::Network(msg) => write!(f, "network error: {}", msg),
            AppError::Service { status, message } => {
                write!(f, "service error ({}): {}", status, message)
            }
            AppError::ServiceUnavailable(msg) => write!(f, "{}", msg),
            AppError::HintUnavailable(msg) => write!(f, "{}", msg),
            AppError::Storage(msg) => write!(f, "storage error: {}", msg),
            AppError::AuthError(msg) => write!(f, "unauthorized: {}", msg),
            AppError::AlreadyFinalized => write!(f, "quiz already finalized"),
            AppError::AlreadySubmitted(id) => write!(f, "attempt {} already submitted", id),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `reqwest::Error` into either a transport or a status error.
/// Allows using `?` operator on client calls.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::Service {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => AppError::Network(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_discriminator() {
        assert_eq!(AppError::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(AppError::Network("x".into()).kind(), ErrorKind::Network);
        assert_eq!(
            AppError::ServiceUnavailable("x".into()).kind(),
            ErrorKind::Service
        );
        assert_eq!(AppError::AlreadyFinalized.kind(), ErrorKind::State);
    }

    #[test]
    fn test_status_of_backend_errors() {
        let err = AppError::Service {
            status: 404,
            message: "Question not found".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(AppError::ServiceUnavailable("down".into()).status(), Some(503));
        assert_eq!(AppError::Storage("disk".into()).status(), None);
    }
}
