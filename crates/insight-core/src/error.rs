//! Error types for authentication and query classification.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Errors raised while issuing or verifying access tokens.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown username, wrong password, or empty credentials.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Token is malformed, carries a bad signature, or names an unknown subject.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token signature is fine but its expiry has passed.
    #[error("token expired")]
    ExpiredToken,

    /// Subject exists but the account is disabled.
    #[error("inactive user: {0}")]
    InactiveUser(String),

    /// Password hashing or hash parsing failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// Token could not be signed.
    #[error("token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Errors raised by the query classifier.
///
/// An unrecognized query is a normal outcome the caller is expected to
/// surface as "please rephrase", not a server fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Query text was empty after trimming.
    #[error("query must not be empty")]
    EmptyQuery,

    /// No intent matched the normalized text.
    #[error("unrecognized query: '{normalized}'")]
    UnrecognizedQuery {
        /// The normalized input, kept for diagnostics.
        normalized: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_token_display() {
        let err = AuthError::InvalidToken("bad signature".to_string());
        let msg = err.to_string();
        assert!(msg.contains("invalid token"));
        assert!(msg.contains("bad signature"));
    }

    #[test]
    fn test_expired_token_display() {
        assert_eq!(AuthError::ExpiredToken.to_string(), "token expired");
    }

    #[test]
    fn test_inactive_user_display() {
        let err = AuthError::InactiveUser("bob".to_string());
        assert_eq!(err.to_string(), "inactive user: bob");
    }

    #[test]
    fn test_unrecognized_query_display() {
        let err = QueryError::UnrecognizedQuery {
            normalized: "asdkjasjdk".to_string(),
        };
        assert_eq!(err.to_string(), "unrecognized query: 'asdkjasjdk'");
    }

    #[test]
    fn test_empty_query_display() {
        assert_eq!(QueryError::EmptyQuery.to_string(), "query must not be empty");
    }
}
