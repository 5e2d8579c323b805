//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured level when set.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Builds the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()))
}

/// Installs the global subscriber.
///
/// Returns `false` if a subscriber was already installed, which makes
/// repeated calls (tests, embedding applications) harmless.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let installed = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
