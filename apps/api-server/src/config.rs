//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use agora_core::RetryPolicy;
use agora_infra::{DatabaseConfig, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Backoff for vote transactions aborted by the store.
    pub vote_retry: RetryPolicy,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 10),
            sqlx_logging: parse_var("DB_SQL_LOGGING", false),
        });

        let defaults = RetryPolicy::default();
        let vote_retry = RetryPolicy::new(
            parse_var("VOTE_RETRY_ATTEMPTS", defaults.max_attempts),
            Duration::from_millis(parse_var(
                "VOTE_RETRY_BASE_MS",
                defaults.base_delay.as_millis() as u64,
            )),
            Duration::from_millis(parse_var(
                "VOTE_RETRY_MAX_MS",
                defaults.max_delay.as_millis() as u64,
            )),
        );

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            database,
            vote_retry,
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset or malformed.
fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
