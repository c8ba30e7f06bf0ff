//! API route definitions.

mod health;
mod query;
mod token;

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::middleware;
use axum::response::Response;
use axum::routing::{get, post};

use crate::auth::require_auth;
use crate::state::AppState;

pub use self::query::{QueryRequest, QueryResponse};
pub use self::token::{LoginForm, TokenResponse};

/// Build the complete API router.
///
/// # Route Structure
///
/// ## Public (no auth)
/// - `GET /health` - Health check
/// - `POST /token` - Exchange form-encoded username/password for a bearer token
///
/// ## Protected (bearer token required)
/// - `GET /me` - Identity behind the token
/// - `POST /query` - Classify a question and return sample rows
/// - `POST /explain` - Explain how a question would be interpreted
/// - `POST /validate` - Check whether a question can be answered
pub fn router(state: AppState) -> Router {
    // Public routes (no authentication)
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/token",
            post(token::issue_token).layer(middleware::map_response(no_store)),
        );

    // Protected routes
    let protected = Router::new()
        .route("/me", get(health::whoami))
        .route("/query", post(query::run_query))
        .route("/explain", post(query::explain_query))
        .route("/validate", post(query::validate_query))
        // Only matched routes; unknown paths still 404 rather than 401.
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
}

/// Forbid caching of token responses.
async fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
