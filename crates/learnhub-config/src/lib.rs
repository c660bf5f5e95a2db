//! # learnhub-config
//!
//! Configuration loaded from environment variables:
//!
//! - [`database`]: PostgreSQL connection settings
//! - [`logging`]: log level, format, and optional file output
//!
//! Every config type has a `from_env()` constructor and a `from_lookup()`
//! constructor taking any `Fn(&str) -> Option<String>`, which is what tests
//! use instead of mutating the process environment.
//!
//! # Example
//!
//! ```ignore
//! use learnhub_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! ```

pub mod database;
pub mod logging;

pub use database::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// All configuration needed to run the learnhub binary.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(&lookup)?,
        })
    }
}

/// Parses an optional numeric variable, falling back to `default` when unset.
pub(crate) fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_app_config_requires_database_url() {
        let env: HashMap<&str, &str> = HashMap::new();
        let err = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_app_config_loads_all_sections() {
        let env = HashMap::from([
            ("DATABASE_URL", "postgres://localhost/learnhub"),
            ("LOG_LEVEL", "debug"),
        ]);
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.database.url, "postgres://localhost/learnhub");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        let lookup = |_: &str| Some("many".to_string());
        let err = parse_or::<_, u32>(&lookup, "DATABASE_MAX_CONNECTIONS", 5).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
