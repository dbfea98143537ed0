// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Structural settings (backends, URLs, bind address) are validated eagerly and
//! failures are deployment errors. Secrets are read but allowed to be missing:
//! the operations that need them answer 500 instead of the process refusing to
//! start.

use anyhow::Result;
use std::fmt;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads an optional secret. Unset and empty are both `None`.
macro_rules! optional_secret {
    // ---
    ($key:literal) => {
        std::env::var($key).ok().filter(|v| !v.is_empty())
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub auth: auth::AuthConfig,
    pub telegram: auth::TelegramConfig,
    pub rate_limit: rate_limit::RateLimitConfig,
    pub review_store: reviews::ReviewStoreConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if a selected backend is missing its required settings
    /// or a setting has an unrecognised value.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            server: server::ServerConfig::from_env()?,
            auth: auth::AuthConfig::from_env(),
            telegram: auth::TelegramConfig::from_env(),
            rate_limit: rate_limit::RateLimitConfig::from_env()?,
            review_store: reviews::ReviewStoreConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MetricsType {
        Noop,
        Prom,
    }

    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Listen address. Defaults to `127.0.0.1:8080`.
        pub bind_addr: String,

        /// Metrics backend. Defaults to no-op.
        pub metrics_type: MetricsType,
    }

    impl ServerConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_addr = std::env::var("MINIAPP_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

            let metrics_type = match std::env::var("MINIAPP_METRICS_TYPE").as_deref() {
                Err(_) | Ok("noop") => MetricsType::Noop,
                Ok("prom") => MetricsType::Prom,
                Ok(other) => anyhow::bail!("Unknown MINIAPP_METRICS_TYPE: {other}"),
            };

            Ok(Self {
                bind_addr,
                metrics_type,
            })
        }
    }
}
pub use server::{MetricsType, ServerConfig};

// ============================================================
// Auth configuration
// ============================================================

mod auth {
    // ---
    use super::*;
    use crate::auth::DEFAULT_COOKIE_NAME;

    const DEFAULT_TTL_MIN: i64 = 30;
    const MAX_TTL_MIN: i64 = 7 * 24 * 60;

    /// Admin session settings and the server secret.
    #[derive(Clone)]
    pub struct AuthConfig {
        /// `HMAC_SECRET`: signs session tokens, fingerprints and user hashes.
        pub hmac_secret: Option<String>,

        /// `ADMIN_PASSPHRASE_HASH`: argon2 PHC string or `scrypt$...` record.
        pub passphrase_hash: Option<String>,

        /// `ADMIN_COOKIE_NAME`, default `__mgr`.
        pub cookie_name: String,

        /// `ADMIN_COOKIE_DOMAIN`. Issuing a cookie without it is a configuration error.
        pub cookie_domain: Option<String>,

        /// `ADMIN_TTL_MIN` minutes, default 30. Values outside one minute to one
        /// week fall back to the default.
        pub session_ttl: Duration,
    }

    impl AuthConfig {
        pub fn from_env() -> Self {
            // ---
            let ttl_min = optional_env_parse!("ADMIN_TTL_MIN", i64, DEFAULT_TTL_MIN);
            let ttl_min = if (1..=MAX_TTL_MIN).contains(&ttl_min) {
                ttl_min
            } else {
                DEFAULT_TTL_MIN
            };

            let cookie_name = std::env::var("ADMIN_COOKIE_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());

            Self {
                hmac_secret: optional_secret!("HMAC_SECRET"),
                passphrase_hash: optional_secret!("ADMIN_PASSPHRASE_HASH"),
                cookie_name,
                cookie_domain: optional_secret!("ADMIN_COOKIE_DOMAIN"),
                session_ttl: Duration::from_secs(ttl_min.unsigned_abs() * 60),
            }
        }
    }

    impl fmt::Debug for AuthConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            // ---
            f.debug_struct("AuthConfig")
                .field("hmac_secret", &self.hmac_secret.as_ref().map(|_| "<redacted>"))
                .field(
                    "passphrase_hash",
                    &self.passphrase_hash.as_ref().map(|_| "<redacted>"),
                )
                .field("cookie_name", &self.cookie_name)
                .field("cookie_domain", &self.cookie_domain)
                .field("session_ttl", &self.session_ttl)
                .finish()
        }
    }

    /// Telegram Mini App settings.
    #[derive(Clone)]
    pub struct TelegramConfig {
        /// `TELEGRAM_WEBAPP_SECRET`: key for the `initData` hash.
        pub webapp_secret: Option<String>,
    }

    impl TelegramConfig {
        pub fn from_env() -> Self {
            Self {
                webapp_secret: optional_secret!("TELEGRAM_WEBAPP_SECRET"),
            }
        }
    }

    impl fmt::Debug for TelegramConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            // ---
            f.debug_struct("TelegramConfig")
                .field(
                    "webapp_secret",
                    &self.webapp_secret.as_ref().map(|_| "<redacted>"),
                )
                .finish()
        }
    }
}
pub use auth::{AuthConfig, TelegramConfig};

// ============================================================
// Rate limit configuration
// ============================================================

mod rate_limit {
    // ---
    use super::*;
    use crate::domain::RateLimitPolicy;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RateLimitBackend {
        /// Process-local counters. Correct only for a single instance.
        Memory,

        /// Counters shared through Redis.
        Redis { url: String },
    }

    #[derive(Debug, Clone)]
    pub struct RateLimitConfig {
        pub backend: RateLimitBackend,
        pub policy: RateLimitPolicy,
    }

    impl RateLimitConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            let backend = match std::env::var("MINIAPP_RATE_LIMIT_BACKEND").as_deref() {
                Err(_) | Ok("memory") => RateLimitBackend::Memory,
                Ok("redis") => RateLimitBackend::Redis {
                    url: required_env!("MINIAPP_REDIS_URL"),
                },
                Ok(other) => anyhow::bail!("Unknown MINIAPP_RATE_LIMIT_BACKEND: {other}"),
            };

            let defaults = RateLimitPolicy::default();
            let window_secs = optional_env_parse!(
                "MINIAPP_RATE_LIMIT_WINDOW_SEC",
                u64,
                defaults.window.as_secs()
            );
            let max_attempts = optional_env_parse!(
                "MINIAPP_RATE_LIMIT_MAX_ATTEMPTS",
                u32,
                defaults.max_attempts
            );

            Ok(Self {
                backend,
                policy: RateLimitPolicy {
                    window: Duration::from_secs(window_secs.max(1))
                        .min(RateLimitPolicy::MAX_WINDOW),
                    max_attempts: max_attempts.max(1),
                },
            })
        }
    }
}
pub use rate_limit::{RateLimitBackend, RateLimitConfig};

// ============================================================
// Review store configuration
// ============================================================

mod reviews {
    // ---
    use super::*;

    /// Postgres connection settings for the review store.
    #[derive(Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `DATABASE_URL` is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let acquire_timeout_secs =
                optional_env_parse!("MINIAPP_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("MINIAPP_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("MINIAPP_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }

    // The URL usually embeds a password.
    impl fmt::Debug for DatabaseConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            // ---
            f.debug_struct("DatabaseConfig")
                .field("database_url", &"<redacted>")
                .field("acquire_timeout", &self.acquire_timeout)
                .field("min_connections", &self.min_connections)
                .field("max_connections", &self.max_connections)
                .finish()
        }
    }

    #[derive(Debug, Clone)]
    pub enum ReviewStoreConfig {
        /// In-process store knowing only these teachers.
        Memory { teacher_ids: Vec<i32> },

        Postgres(DatabaseConfig),
    }

    impl ReviewStoreConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            match std::env::var("MINIAPP_REVIEW_STORE").as_deref() {
                Err(_) | Ok("memory") => {
                    let raw = std::env::var("MINIAPP_MEMORY_TEACHER_IDS")
                        .unwrap_or_else(|_| "1,2,3".to_string());
                    Ok(Self::Memory {
                        teacher_ids: parse_teacher_ids(&raw)?,
                    })
                }
                Ok("postgres") => Ok(Self::Postgres(DatabaseConfig::from_env()?)),
                Ok(other) => anyhow::bail!("Unknown MINIAPP_REVIEW_STORE: {other}"),
            }
        }
    }

    fn parse_teacher_ids(raw: &str) -> Result<Vec<i32>> {
        // ---
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<i32>() {
                Ok(id) if id > 0 => Ok(id),
                _ => Err(anyhow::anyhow!(
                    "Invalid teacher id in MINIAPP_MEMORY_TEACHER_IDS: {s}"
                )),
            })
            .collect()
    }
}
pub use reviews::{DatabaseConfig, ReviewStoreConfig};

// ============================================================
// Tests
// ============================================================
