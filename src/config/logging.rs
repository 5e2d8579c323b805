//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if LEVELS.contains(&self.level.to_lowercase().as_str()) {
            Ok(())
        } else {
            Err(ValidationError::InvalidLogLevel(self.level.clone()))
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_plain_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn level_is_case_insensitive() {
        let config = LoggingConfig {
            level: "DEBUG".to_string(),
            json: false,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_level_is_rejected() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            json: false,
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidLogLevel("loud".to_string()))
        );
    }
}
