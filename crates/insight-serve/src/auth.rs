//! Bearer token authentication middleware.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Middleware that requires a valid access token.
///
/// The token must be provided in the `Authorization` header as:
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// Tokens are obtained from `POST /token`. On success the caller's
/// [`Identity`](insight_core::Identity) is stored in the request extensions
/// for handlers to extract.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("missing or malformed authorization header".into()))?;

    let identity = state.tokens.verify_token(token)?;
    // Filled in on the per-request `http_request` span.
    tracing::Span::current().record("username", identity.username.as_str());
    tracing::debug!(username = %identity.username, "request authenticated");

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
