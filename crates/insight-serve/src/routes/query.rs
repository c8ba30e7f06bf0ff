//! Natural-language query endpoints.
//!
//! All three endpoints take the same JSON body and run the same intent
//! matching; they differ in how much they return.

use std::time::Instant;

use axum::extract::State;
use axum::{Extension, Json};
use insight_core::{Explanation, Identity, QueryResult, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body shared by the query endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Query result with timing.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    #[serde(flatten)]
    pub result: QueryResult,
    /// Processing time in seconds.
    pub execution_time: f64,
}

/// `POST /query`
///
/// Classifies the question and returns the matching sample rows.
/// Responds 422 when no intent matches.
pub async fn run_query(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let started = Instant::now();
    let result = state.engine.classify(&request.query)?;
    let execution_time = started.elapsed().as_secs_f64();

    tracing::info!(
        username = %identity.username,
        intent = %result.intent,
        rows = result.rows.len(),
        "query answered"
    );

    Ok(Json(QueryResponse {
        result,
        execution_time,
    }))
}

/// `POST /explain`
///
/// Describes how the question would be interpreted, without data.
pub async fn explain_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Explanation>, ApiError> {
    Ok(Json(state.engine.explain(&request.query)?))
}

/// `POST /validate`
///
/// Reports whether the question can be answered and which keywords it lacks.
pub async fn validate_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Validation>, ApiError> {
    Ok(Json(state.engine.validate(&request.query)?))
}
