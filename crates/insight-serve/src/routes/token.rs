//! Token issuance endpoint.

use axum::extract::State;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Form body of `POST /token`, in OAuth2 password-grant shape.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Successful token response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// `POST /token`
///
/// Exchanges a username and password for a bearer token.
/// Password verification is CPU-bound, so it runs on the blocking pool.
pub async fn issue_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let tokens = state.tokens.clone();
    let username = form.username.clone();

    let issued = tokio::task::spawn_blocking(move || {
        tokens.issue_token(&form.username, &form.password)
    })
    .await
    .map_err(|e| ApiError::Internal(e.into()))?
    .inspect_err(|e| tracing::info!(username = %username, error = %e, "login failed"))?;

    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
    }))
}
