use std::time::Duration;

use serde::{Deserialize, Deserializer};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid value `{value}` for env var {key}")]
    Invalid { key: &'static str, value: String },
}

/// Trait for service configs loaded from environment variables.
///
/// Implement this on a `Deserialize` struct and call `Config::from_env()` at startup.
/// Field names map to upper-cased env vars.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Result<Self, ConfigError> {
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from explicit `(KEY, value)` pairs instead of the process environment.
    fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks run after deserialization.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// `deserialize_with` helper for durations given as whole seconds.
pub fn secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

/// `deserialize_with` helper for durations given as whole milliseconds.
pub fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
