//! API error types and response formatting.

use axum::Json;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use insight_core::{AuthError, QueryError};
use serde::Serialize;

/// API error type that converts to appropriate HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed, or invalid bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Login failed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token has expired.
    #[error("token expired")]
    TokenExpired,

    /// Token is valid but the account is disabled.
    #[error("inactive user: {0}")]
    InactiveUser(String),

    /// Invalid request parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Query text matched no known intent.
    #[error("unrecognized query: '{0}'")]
    UnrecognizedQuery(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::InvalidToken(reason) => Self::Unauthorized(reason),
            AuthError::ExpiredToken => Self::TokenExpired,
            AuthError::InactiveUser(username) => Self::InactiveUser(username),
            err @ (AuthError::PasswordHash(_) | AuthError::Signing(_)) => {
                Self::Internal(anyhow::Error::new(err))
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::EmptyQuery => Self::BadRequest(QueryError::EmptyQuery.to_string()),
            QueryError::UnrecognizedQuery { normalized } => Self::UnrecognizedQuery(normalized),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            Self::Unauthorized(reason) => {
                tracing::debug!(reason = %reason, "request rejected");
                (
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    Some("Could not validate credentials".to_string()),
                )
            }
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                Some("Incorrect username or password".to_string()),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "token_expired",
                Some("Token has expired; request a new one from /token".to_string()),
            ),
            Self::InactiveUser(_) => (
                StatusCode::BAD_REQUEST,
                "inactive_user",
                Some("Inactive user".to_string()),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone())),
            Self::UnrecognizedQuery(normalized) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unrecognized_query",
                Some(format!(
                    "Could not interpret '{normalized}'. Try rephrasing, e.g. 'Show the top 5 customers by sales'"
                )),
            ),
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    Some("An internal error occurred".to_string()),
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_auth_error() {
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::InvalidCredentials
        ));
        assert!(matches!(
            ApiError::from(AuthError::ExpiredToken),
            ApiError::TokenExpired
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidToken("bad".into())),
            ApiError::Unauthorized(reason) if reason == "bad"
        ));
        assert!(matches!(
            ApiError::from(AuthError::PasswordHash("boom".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn error_from_query_error() {
        assert!(matches!(
            ApiError::from(QueryError::EmptyQuery),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(QueryError::UnrecognizedQuery { normalized: "xyz".into() }),
            ApiError::UnrecognizedQuery(text) if text == "xyz"
        ));
    }

    #[test]
    fn error_into_response_unauthorized_sets_challenge() {
        for err in [
            ApiError::Unauthorized("missing".into()),
            ApiError::InvalidCredentials,
            ApiError::TokenExpired,
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
        }
    }

    #[test]
    fn error_into_response_unrecognized_query() {
        let response = ApiError::UnrecognizedQuery("asdkjasjdk".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn error_into_response_inactive_user() {
        let response = ApiError::InactiveUser("bob".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_into_response_internal() {
        let response = ApiError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
