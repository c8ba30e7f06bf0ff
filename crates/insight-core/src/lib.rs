//! Core logic for the Insight analytics query API.
//!
//! This crate provides:
//! - A fixed credential table with Argon2-hashed passwords
//! - Stateless, signed, time-limited access tokens (HS256 JWT)
//! - A keyword-driven query classifier over an in-memory sample dataset
//! - Shared error types
//!
//! Everything here is synchronous and immutable after construction. The HTTP
//! layer lives in `insight-serve`.

pub mod classify;
pub mod credentials;
pub mod dataset;
mod error;
pub mod intent;
pub mod token;

pub use classify::{Explanation, QueryEngine, QueryResult, Validation, normalize};
pub use credentials::{CredentialRecord, CredentialStore, UserEntry};
pub use dataset::{Category, DatasetRow, SampleDataset};
pub use error::{AuthError, AuthResult, QueryError};
pub use intent::Intent;
pub use token::{Claims, DEFAULT_TOKEN_TTL_MINUTES, Identity, IssuedToken, TokenService};
