//! Application configuration management.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger write-path configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Upper bound for a single statement, in milliseconds.
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_statement_timeout_ms() -> u64 {
    5_000
}

/// Ledger write-path configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// How many times a transaction is retried after a serialization failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for the exponential retry backoff, in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_base_delay_ms() -> u64 {
    50
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

/// Runtime settings consumed by the ledger repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Bound applied to every database statement.
    pub statement_timeout: Duration,
    /// Retry budget for serialization failures and deadlocks.
    pub max_retries: u32,
    /// Base delay for the exponential backoff.
    pub retry_base_delay: Duration,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            statement_timeout: Duration::from_millis(default_statement_timeout_ms()),
            max_retries: default_max_retries(),
            retry_base_delay: Duration::from_millis(default_retry_base_delay_ms()),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("CREDITLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Returns the runtime settings for the ledger repositories.
    #[must_use]
    pub fn ledger_settings(&self) -> LedgerSettings {
        LedgerSettings {
            statement_timeout: Duration::from_millis(self.database.statement_timeout_ms),
            max_retries: self.ledger.max_retries,
            retry_base_delay: Duration::from_millis(self.ledger.retry_base_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("CREDITLINE__DATABASE__URL", Some("postgres://localhost/credits")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/credits");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.database.statement_timeout_ms, 5_000);
                assert_eq!(config.ledger.max_retries, 5);
                assert_eq!(config.ledger.retry_base_delay_ms, 50);
            },
        );
    }

    #[test]
    fn test_environment_overrides_ledger_settings() {
        temp_env::with_vars(
            [
                ("CREDITLINE__DATABASE__URL", Some("sqlite::memory:")),
                ("CREDITLINE__DATABASE__STATEMENT_TIMEOUT_MS", Some("250")),
                ("CREDITLINE__LEDGER__MAX_RETRIES", Some("2")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let settings = AppConfig::load().unwrap().ledger_settings();
                assert_eq!(settings.statement_timeout, Duration::from_millis(250));
                assert_eq!(settings.max_retries, 2);
                assert_eq!(settings.retry_base_delay, Duration::from_millis(50));
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("CREDITLINE__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_default_settings_match_config_defaults() {
        let settings = LedgerSettings::default();
        assert_eq!(settings.statement_timeout, Duration::from_secs(5));
        assert_eq!(settings.max_retries, 5);
    }
}
