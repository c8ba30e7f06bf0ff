//! Fixed credential table.
//!
//! The table is built once at startup from plaintext entries, hashing every
//! password with Argon2. It is never mutated afterwards, so it can be shared
//! freely between request handlers.

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Serialize;

use crate::error::{AuthError, AuthResult};

/// A user account as supplied by configuration, before hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub username: String,
    pub password: String,
    pub role: String,
    pub disabled: bool,
}

impl UserEntry {
    /// Create an enabled account.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.into(),
            disabled: false,
        }
    }

    /// Mark the account as disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Stored credential with the password kept only as an Argon2 PHC string.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialRecord {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub disabled: bool,
}

/// Immutable username → credential lookup table.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    records: HashMap<String, CredentialRecord>,
}

impl CredentialStore {
    /// Build the table, hashing each password.
    ///
    /// Later entries with a duplicate username replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = UserEntry>) -> AuthResult<Self> {
        let argon2 = Argon2::default();
        let mut records = HashMap::new();

        for entry in entries {
            let salt = SaltString::generate(&mut OsRng);
            let password_hash = argon2
                .hash_password(entry.password.as_bytes(), &salt)
                .map_err(|e| AuthError::PasswordHash(e.to_string()))?
                .to_string();

            records.insert(
                entry.username.clone(),
                CredentialRecord {
                    username: entry.username,
                    password_hash,
                    role: entry.role,
                    disabled: entry.disabled,
                },
            );
        }

        tracing::debug!(accounts = records.len(), "credential table built");
        Ok(Self { records })
    }

    /// Look up a record by username.
    pub fn get(&self, username: &str) -> Option<&CredentialRecord> {
        self.records.get(username)
    }

    /// Check a username/password pair against the table.
    ///
    /// Disabled accounts still authenticate here; the active check happens
    /// when their token is presented.
    pub fn authenticate(&self, username: &str, password: &str) -> AuthResult<&CredentialRecord> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let record = self
            .records
            .get(username)
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&record.password_hash)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::from_entries([
            UserEntry::new("analyst", "analystpass", "analyst"),
            UserEntry::new("admin", "s3cret", "admin"),
        ])
        .unwrap()
    }

    #[test]
    fn test_passwords_are_hashed() {
        let store = store();
        let record = store.get("analyst").unwrap();
        assert_ne!(record.password_hash, "analystpass");
        assert!(record.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn test_authenticate_valid_pairs() {
        let store = store();
        assert_eq!(
            store.authenticate("analyst", "analystpass").unwrap().role,
            "analyst"
        );
        assert_eq!(store.authenticate("admin", "s3cret").unwrap().role, "admin");
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let err = store().authenticate("analyst", "nope").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_authenticate_unknown_user() {
        let err = store().authenticate("mallory", "analystpass").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_authenticate_empty_fields() {
        let store = store();
        assert!(matches!(
            store.authenticate("", "analystpass"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            store.authenticate("analyst", ""),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_duplicate_username_last_wins() {
        let store = CredentialStore::from_entries([
            UserEntry::new("analyst", "first", "analyst"),
            UserEntry::new("analyst", "second", "admin"),
        ])
        .unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.authenticate("analyst", "first").is_err());
        assert_eq!(store.authenticate("analyst", "second").unwrap().role, "admin");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let store = store();
        let json = serde_json::to_string(store.get("admin").unwrap()).unwrap();
        assert!(json.contains("\"username\":\"admin\""));
        assert!(!json.contains("password_hash"));
    }
}
