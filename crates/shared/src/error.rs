//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// These are the only error kinds that cross the request boundary; the
/// API layer translates them into HTTP status codes and the
/// `{success: false, message}` envelope.
#[derive(Debug, Error)]
pub enum AppError {
    /// No credential or an invalid credential was presented.
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    /// Authenticated, but not the owner of the target resource.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or disallowed upload, or malformed request body.
    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    /// Unexpected storage/database/object-store error. The message is
    /// for logs only; responses carry a generic message instead.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::InvalidMedia(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the message safe to put in a response body.
    ///
    /// Internal errors never leak their detail to callers.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::Unauthenticated(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::InvalidMedia(msg) => msg,
            Self::Internal(_) => "An unexpected error occurred",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthenticated(String::new()), 401)]
    #[case(AppError::Forbidden(String::new()), 403)]
    #[case(AppError::NotFound(String::new()), 404)]
    #[case(AppError::InvalidMedia(String::new()), 400)]
    #[case(AppError::Internal(String::new()), 500)]
    fn test_error_status_codes(#[case] err: AppError, #[case] expected: u16) {
        assert_eq!(err.status_code(), expected);
    }

    #[test]
    fn test_internal_detail_never_leaks() {
        let err = AppError::Internal("connection refused on 10.0.0.3".into());
        assert_eq!(err.public_message(), "An unexpected error occurred");
    }

    #[test]
    fn test_public_message_passthrough() {
        let err = AppError::Forbidden("You are not the author of this post".into());
        assert_eq!(err.public_message(), "You are not the author of this post");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::InvalidMedia("msg".into()).to_string(),
            "Invalid media: msg"
        );
    }
}
