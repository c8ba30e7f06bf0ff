//! Signed, time-limited bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the subject, role, issue time, and expiry.
//! Verification is fully stateless: a token is valid while its signature
//! checks out against the process secret and `now <= exp`. There is no
//! revocation list.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::credentials::CredentialStore;
use crate::error::{AuthError, AuthResult};

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// JWT claims for access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    /// Role at issue time.
    pub role: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

/// An issued token together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    /// Expiry (Unix seconds).
    pub expires_at: i64,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// Authenticated caller, resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    pub role: String,
}

/// Issues and verifies access tokens against a fixed credential table.
#[derive(Clone)]
pub struct TokenService {
    credentials: Arc<CredentialStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service signing with `secret`.
    pub fn new(credentials: Arc<CredentialStore>, secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by hand so the boundary is exact and the clock injectable.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            credentials,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Authenticate a username/password pair and issue a token.
    pub fn issue_token(&self, username: &str, password: &str) -> AuthResult<IssuedToken> {
        self.issue_token_at(username, password, Utc::now().timestamp())
    }

    /// Like [`issue_token`](Self::issue_token) with an explicit clock (Unix seconds).
    pub fn issue_token_at(
        &self,
        username: &str,
        password: &str,
        now: i64,
    ) -> AuthResult<IssuedToken> {
        let record = self.credentials.authenticate(username, password)?;

        let expires_in = self.ttl.num_seconds();
        let claims = Claims {
            sub: record.username.clone(),
            role: record.role.clone(),
            iat: now,
            exp: now + expires_in,
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        tracing::info!(username = %record.username, exp = claims.exp, "token issued");
        Ok(IssuedToken {
            access_token,
            expires_at: claims.exp,
            expires_in,
        })
    }

    /// Verify a presented token and resolve the caller's identity.
    pub fn verify_token(&self, token: &str) -> AuthResult<Identity> {
        self.verify_token_at(token, Utc::now().timestamp())
    }

    /// Like [`verify_token`](Self::verify_token) with an explicit clock (Unix seconds).
    ///
    /// A token is still valid at exactly its `exp` second.
    pub fn verify_token_at(&self, token: &str, now: i64) -> AuthResult<Identity> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        if now > claims.exp {
            tracing::debug!(sub = %claims.sub, exp = claims.exp, now, "token expired");
            return Err(AuthError::ExpiredToken);
        }

        let record = self
            .credentials
            .get(&claims.sub)
            .ok_or_else(|| AuthError::InvalidToken("unknown subject".to_string()))?;

        if record.disabled {
            return Err(AuthError::InactiveUser(record.username.clone()));
        }

        Ok(Identity {
            username: record.username.clone(),
            role: record.role.clone(),
        })
    }
}
