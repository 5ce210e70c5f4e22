//! Process configuration, read from the environment at startup.
//!
//! `from_env` loads an optional `.env` file first; parsing itself goes through
//! [`AppConfig::from_lookup`] so it can be tested without touching the
//! process environment.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
/// Upper bound for `TOKEN_TTL_SECS` (ten years).
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not valid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Postgres connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl core::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // The URL may carry a password.
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// Which `AccountStore` implementation to run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres(DatabaseConfig),
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::InMemory => "in-memory",
            StoreBackend::Postgres(_) => "postgres",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,

    /// HMAC signing key for account tokens (`JWT_SECRET`).
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds (`TOKEN_TTL_SECS`); `None` issues non-expiring tokens.
    pub token_ttl_secs: Option<u64>,

    pub store: StoreBackend,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("listen_addr", &self.listen_addr)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("store", &self.store)
            .finish()
    }
}

impl AppConfig {
    /// Read configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("ignoring unreadable .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr = get("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "LISTEN_ADDR",
                reason: e.to_string(),
            })?;

        let jwt_secret = lookup("JWT_SECRET").filter(|v| !v.is_empty());

        let token_ttl_secs = get("TOKEN_TTL_SECS")
            .map(|v| parse_number::<u64>("TOKEN_TTL_SECS", &v))
            .transpose()?
            .filter(|secs| *secs > 0);
        if let Some(secs) = token_ttl_secs.filter(|secs| *secs > MAX_TOKEN_TTL_SECS) {
            return Err(ConfigError::Invalid {
                var: "TOKEN_TTL_SECS",
                reason: format!("{secs} exceeds the maximum of {MAX_TOKEN_TTL_SECS}"),
            });
        }

        let use_persistent = get("USE_PERSISTENT_STORES")
            .map(|v| parse_bool("USE_PERSISTENT_STORES", &v))
            .transpose()?
            .unwrap_or(false);

        let store = if use_persistent {
            let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = get("DATABASE_MAX_CONNECTIONS")
                .map(|v| parse_number::<u32>("DATABASE_MAX_CONNECTIONS", &v))
                .transpose()?
                .unwrap_or(DEFAULT_MAX_CONNECTIONS);
            let acquire_timeout_secs = get("DATABASE_ACQUIRE_TIMEOUT_SECS")
                .map(|v| parse_number::<u64>("DATABASE_ACQUIRE_TIMEOUT_SECS", &v))
                .transpose()?
                .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS);

            if max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DATABASE_MAX_CONNECTIONS",
                    reason: "must be at least 1".into(),
                });
            }

            StoreBackend::Postgres(DatabaseConfig {
                url,
                max_connections,
                acquire_timeout_secs,
            })
        } else {
            StoreBackend::InMemory
        };

        Ok(Self {
            listen_addr,
            jwt_secret,
            token_ttl_secs,
            store,
        })
    }
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}
