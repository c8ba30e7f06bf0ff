//! Application state and configuration.

use std::sync::Arc;

use chrono::Duration;
use insight_core::{
    CredentialStore, DEFAULT_TOKEN_TTL_MINUTES, QueryEngine, SampleDataset, TokenService,
    UserEntry,
};

/// Role given to configured users that don't name one.
const DEFAULT_ROLE: &str = "analyst";

/// Upper bound on the token lifetime (one year).
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Application configuration loaded from environment.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8000").
    pub bind_addr: String,

    /// Secret used to sign access tokens.
    pub secret_key: String,

    /// Access token lifetime in minutes.
    pub token_ttl_minutes: i64,

    /// Accounts allowed to request tokens.
    pub users: Vec<UserEntry>,

    /// Database location. Accepted for compatibility; the dataset is in-memory.
    pub database_url: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("secret_key", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field(
                "users",
                &self.users.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
            )
            .field("database_url", &self.database_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `INSIGHT_SECRET_KEY`: Token signing secret
    ///
    /// Optional environment variables:
    /// - `INSIGHT_BIND_ADDR`: Server bind address (default: "0.0.0.0:8000")
    /// - `INSIGHT_TOKEN_TTL_MINUTES`: Token lifetime (default: 30)
    /// - `INSIGHT_USERS`: Comma-separated `username:password[:role]` entries,
    ///   `!` prefix for a disabled account (default: a single `analyst` account)
    /// - `DATABASE_URL`: Database location (unused, the dataset is in-memory)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("INSIGHT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let secret_key = std::env::var("INSIGHT_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("INSIGHT_SECRET_KEY environment variable is required"))?;
        if secret_key.trim().is_empty() {
            anyhow::bail!("INSIGHT_SECRET_KEY must not be empty");
        }

        let token_ttl_minutes = match std::env::var("INSIGHT_TOKEN_TTL_MINUTES") {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) => minutes,
                _ => anyhow::bail!(
                    "INSIGHT_TOKEN_TTL_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}, got '{raw}'"
                ),
            },
            Err(_) => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let users = match std::env::var("INSIGHT_USERS") {
            Ok(raw) => parse_users(&raw)?,
            Err(_) => vec![UserEntry::new("analyst", "analystpass", DEFAULT_ROLE)],
        };

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        tracing::info!(
            bind_addr = %bind_addr,
            token_ttl_minutes,
            user_count = users.len(),
            database_url = ?database_url,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            secret_key,
            token_ttl_minutes,
            users,
            database_url,
        })
    }
}

/// Parse `username:password[:role]` entries separated by commas.
///
/// A leading `!` marks the account disabled: it can log in, but its tokens
/// are refused.
fn parse_users(raw: &str) -> anyhow::Result<Vec<UserEntry>> {
    let users = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (disabled, entry) = match entry.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, entry),
            };
            let mut parts = entry.splitn(3, ':');
            let username = parts.next().unwrap_or_default().trim();
            let password = parts.next().unwrap_or_default();
            let role = parts
                .next()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_ROLE);

            if username.is_empty() || password.is_empty() {
                anyhow::bail!("invalid INSIGHT_USERS entry '{username}': expected username:password[:role]");
            }
            let user = UserEntry::new(username, password, role);
            Ok(if disabled { user.disabled() } else { user })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if users.is_empty() {
        anyhow::bail!("INSIGHT_USERS must contain at least one user");
    }
    Ok(users)
}

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Token issuance and verification.
    pub tokens: TokenService,

    /// Query classifier over the sample dataset.
    pub engine: Arc<QueryEngine>,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// Hashes every configured password, so this is done once at startup.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let credentials = CredentialStore::from_entries(config.users.iter().cloned())?;
        let tokens = TokenService::new(
            Arc::new(credentials),
            &config.secret_key,
            Duration::minutes(config.token_ttl_minutes),
        );

        let dataset = SampleDataset::builtin();
        tracing::info!(
            accounts = tokens.credentials().len(),
            dataset_rows = dataset.len(),
            token_ttl_secs = tokens.ttl().num_seconds(),
            "application state initialized"
        );

        Ok(Self {
            tokens,
            engine: Arc::new(QueryEngine::new(dataset)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize config tests that manipulate env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "INSIGHT_BIND_ADDR",
        "INSIGHT_SECRET_KEY",
        "INSIGHT_TOKEN_TTL_MINUTES",
        "INSIGHT_USERS",
        "DATABASE_URL",
    ];

    /// Run `f` with only `vars` set among the config keys.
    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: Serialized by mutex; only test code touches these vars.
        unsafe {
            for k in ENV_KEYS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        // SAFETY: Restoring original env state.
        unsafe {
            for (k, v) in &saved {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn config_defaults() {
        with_env_vars(&[("INSIGHT_SECRET_KEY", "s3cret")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.bind_addr, "0.0.0.0:8000");
            assert_eq!(config.secret_key, "s3cret");
            assert_eq!(config.token_ttl_minutes, 30);
            assert_eq!(
                config.users,
                vec![UserEntry::new("analyst", "analystpass", "analyst")]
            );
            assert_eq!(config.database_url, None);
        });
    }

    #[test]
    fn config_custom_values() {
        with_env_vars(
            &[
                ("INSIGHT_SECRET_KEY", "another"),
                ("INSIGHT_BIND_ADDR", "127.0.0.1:9090"),
                ("INSIGHT_TOKEN_TTL_MINUTES", "5"),
                ("DATABASE_URL", "sqlite://:memory:"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.bind_addr, "127.0.0.1:9090");
                assert_eq!(config.token_ttl_minutes, 5);
                assert_eq!(config.database_url.as_deref(), Some("sqlite://:memory:"));
            },
        );
    }

    #[test]
    fn config_requires_secret() {
        with_env_vars(&[], || {
            assert!(Config::from_env().is_err());
        });
        with_env_vars(&[("INSIGHT_SECRET_KEY", "  ")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_rejects_bad_ttl() {
        for ttl in ["0", "-5", "soon", "99999999999"] {
            with_env_vars(
                &[("INSIGHT_SECRET_KEY", "s"), ("INSIGHT_TOKEN_TTL_MINUTES", ttl)],
                || {
                    assert!(Config::from_env().is_err(), "ttl {ttl} should be rejected");
                },
            );
        }
    }

    #[test]
    fn config_users_parsing() {
        with_env_vars(
            &[
                ("INSIGHT_SECRET_KEY", "s"),
                ("INSIGHT_USERS", "alice:pw1:admin, bob:pw2 ,,"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(
                    config.users,
                    vec![
                        UserEntry::new("alice", "pw1", "admin"),
                        UserEntry::new("bob", "pw2", "analyst"),
                    ]
                );
            },
        );
    }

    #[test]
    fn config_users_rejects_invalid_entries() {
        assert!(parse_users("alice").is_err());
        assert!(parse_users(":pw").is_err());
        assert!(parse_users(" , ,").is_err());
        assert!(parse_users("!:pw").is_err());
    }

    #[test]
    fn config_users_disabled_prefix() {
        let users = parse_users("alice:pw1, !bob:pw2:admin").unwrap();
        assert_eq!(
            users,
            vec![
                UserEntry::new("alice", "pw1", "analyst"),
                UserEntry::new("bob", "pw2", "admin").disabled(),
            ]
        );
    }

    #[test]
    fn config_debug_redacts_secrets() {
        let config = Config {
            bind_addr: "127.0.0.1:0".to_string(),
            secret_key: "top-secret".to_string(),
            token_ttl_minutes: 30,
            users: vec![UserEntry::new("alice", "hunter2", "analyst")],
            database_url: None,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("top-secret"));
        assert!(!debug.contains("hunter2"));
    }
}
