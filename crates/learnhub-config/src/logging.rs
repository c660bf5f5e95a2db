//! Logging settings.
//!
//! - `LOG_LEVEL`: level for learnhub targets (default: `info`)
//! - `LOG_FORMAT`: `compact` or `json` console output (default: `compact`)
//! - `LOG_DIR`: when set, a daily rolling JSON log is also written there

use crate::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Compact,
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            level: lookup("LOG_LEVEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "info".into()),
            format,
            log_dir: lookup("LOG_DIR").filter(|v| !v.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = LoggingConfig::from_lookup(&|_: &str| None).unwrap();
        assert_eq!(config, LoggingConfig::default());
    }

    #[test]
    fn test_json_format_and_dir() {
        let config = LoggingConfig::from_lookup(&|k: &str| match k {
            "LOG_FORMAT" => Some("json".into()),
            "LOG_DIR" => Some("storage/logs".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir.as_deref(), Some("storage/logs"));
    }

    #[test]
    fn test_unknown_format() {
        let err = LoggingConfig::from_lookup(&|k: &str| {
            (k == "LOG_FORMAT").then(|| "xml".to_string())
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "LOG_FORMAT",
                value: "xml".into()
            }
        );
    }
}
