//! Insight Serve - HTTP API for natural-language analytics queries
//!
//! This crate exposes the `insight-core` classifier over HTTP. Clients
//! exchange a username and password for a short-lived bearer token, then
//! post free-text questions and receive canned rows from the sample dataset.
//!
//! # Authentication
//!
//! `POST /token` issues a signed token (HS256 JWT). Every other endpoint
//! except `/health` requires it as `Authorization: Bearer <token>`.
//!
//! # Architecture
//!
//! - **AppState**: Shared, immutable state (configuration, token service, query engine)
//! - **Auth**: Bearer token middleware for request authentication
//! - **Routes**: Endpoint handlers grouped by domain

mod auth;
mod error;
mod routes;
mod state;

pub use self::auth::require_auth;
pub use self::error::ApiError;
pub use self::routes::{LoginForm, QueryRequest, QueryResponse, TokenResponse, router};
pub use self::state::{AppState, Config};
