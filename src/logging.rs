//! Tracing subscriber setup.

use crate::config::LogConfig;
use crate::error::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the event filter. `RUST_LOG` wins over the configured level.
fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber, writing to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config));
    let result = if config.json {
        let layer = tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr);
        registry.with(layer).try_init()
    } else {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        registry.with(layer).try_init()
    };
    result.map_err(|e| Error::Config(format!("failed to initialise logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_filter_falls_back_to_configured_level() {
        std::env::remove_var("RUST_LOG");
        let config = LogConfig { level: "project_tracker=debug".to_string(), json: false };
        assert_eq!(env_filter(&config).to_string(), "project_tracker=debug");
    }

    #[test]
    #[serial]
    fn test_second_init_fails() {
        let config = LogConfig::default();
        // The first call may race other tests; only the second must fail.
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
