//! Subscriber setup for binaries

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::net_config::LoggingConfig;

/// Filter directive for `config`: `RUST_LOG` wins, then `filter`, then `level`
pub fn filter_directive(config: &LoggingConfig) -> String {
    if let Ok(directive) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !directive.is_empty() {
            return directive;
        }
    }
    match &config.filter {
        Some(filter) => filter.clone(),
        None => match config.level.to_lowercase().as_str() {
            level @ ("trace" | "debug" | "info" | "warn" | "error") => level.to_string(),
            _ => "info".to_string(),
        },
    }
}

/// Install the global tracing subscriber; fails if one is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(filter_directive(config))
        .map_err(|e| anyhow!("Invalid log filter: {e}"))?;

    let result = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "LOUD".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(filter_directive(&config), "info");

        let config = LoggingConfig {
            level: "DEBUG".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(filter_directive(&config), "debug");
    }

    #[test]
    fn test_filter_overrides_level() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "warn".to_string(),
            filter: Some("steam_jobs=trace,info".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(filter_directive(&config), "steam_jobs=trace,info");
    }
}
