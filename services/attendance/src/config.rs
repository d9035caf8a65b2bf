use std::time::Duration;

use serde::Deserialize;

use rollcall_core::config::{Config, ConfigError, millis, secs};
use rollcall_core::tracing::LogFormat;

/// Data access layer configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Postgres or SQLite connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// Pool ceiling (default 10). Env var: `DB_MAX_CONNECTIONS`.
    #[serde(rename = "db_max_connections", default = "default_max_connections")]
    pub max_connections: u32,
    /// Connections kept open while idle (default 1). Env var: `DB_MIN_CONNECTIONS`.
    #[serde(rename = "db_min_connections", default = "default_min_connections")]
    pub min_connections: u32,
    /// Env var: `DB_CONNECT_TIMEOUT_SECS` (default 8).
    #[serde(
        rename = "db_connect_timeout_secs",
        default = "default_db_timeout",
        deserialize_with = "secs"
    )]
    pub connect_timeout: Duration,
    /// Time a query may wait for a pooled connection. Env var: `DB_ACQUIRE_TIMEOUT_SECS` (default 8).
    #[serde(
        rename = "db_acquire_timeout_secs",
        default = "default_db_timeout",
        deserialize_with = "secs"
    )]
    pub acquire_timeout: Duration,
    /// Log every statement at debug level. Env var: `DB_SQL_LOGGING` (default off).
    #[serde(rename = "db_sql_logging", default)]
    pub sql_logging: bool,
    /// Default time to wait for a transaction to start. Env var: `TX_MAX_WAIT_MS` (default 2000).
    #[serde(
        rename = "tx_max_wait_ms",
        default = "default_tx_max_wait",
        deserialize_with = "millis"
    )]
    pub tx_max_wait: Duration,
    /// Default time a transaction body may run. Env var: `TX_TIMEOUT_MS` (default 5000).
    #[serde(
        rename = "tx_timeout_ms",
        default = "default_tx_timeout",
        deserialize_with = "millis"
    )]
    pub tx_timeout: Duration,
    /// Env var: `LOG_FORMAT`, `json` (default) or `pretty`.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_db_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_tx_max_wait() -> Duration {
    Duration::from_millis(2000)
}

fn default_tx_timeout() -> Duration {
    Duration::from_millis(5000)
}

impl Config for StoreConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.is_empty() {
            return Err(ConfigError::Invalid {
                key: "DATABASE_URL",
                value: String::new(),
            });
        }
        if self.max_connections == 0 || self.max_connections < self.min_connections {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: self.max_connections.to_string(),
            });
        }
        Ok(())
    }
}
