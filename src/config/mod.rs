//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CHAOS_DRAFT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use chaos_draft::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Default packs per player: {}", config.draft.packs_per_player);
//! ```

mod database;
mod draft;
mod error;
mod logging;

pub use database::DatabaseConfig;
pub use draft::DraftConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a valid
/// in-memory configuration. Load using [`AppConfig::load()`].
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection, optional)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Draft engine settings
    #[serde(default)]
    pub draft: DraftConfig,

    /// Log level and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CHAOS_DRAFT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CHAOS_DRAFT__DATABASE__URL=...` -> `database.url = ...`
    /// - `CHAOS_DRAFT__DRAFT__PACKS_PER_PLAYER=4` -> `draft.packs_per_player = 4`
    /// - `CHAOS_DRAFT__LOGGING__JSON=true` -> `logging.json = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHAOS_DRAFT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.draft.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }
}
