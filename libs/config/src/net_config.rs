//! Layered configuration loading
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file
//! 3. Environment variables: `STEAM_<SECTION>__<KEY>`, for example
//!    `STEAM_CODEC__MAX_MESSAGE_SIZE=65536` or `STEAM_LOGGING__JSON=true`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use steam_codec::CodecOptions;
use steam_jobs::JobOptions;
use tracing::{debug, info};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "STEAM";

/// Logging settings consumed by [`crate::logging::init_logging`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when no filter is given (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Full `EnvFilter` directive, e.g. `steam_codec=trace,info`; overrides `level`
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            filter: None,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    pub logging: LoggingConfig,
    pub codec: CodecOptions,
    pub jobs: JobOptions,
}

impl NetConfig {
    /// Load defaults, then `path` if given, then `STEAM_` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// As [`NetConfig::load`] with a custom environment prefix
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            let path = expand_path(path)?;
            info!("Loading configuration from {:?}", path);
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml).required(true));
        } else {
            debug!("No configuration file given, using defaults");
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Parse a TOML document without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Expand `~` and `$VAR` references in a configuration path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand configuration path {raw}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NetConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.codec.validate_header_constants);
        assert_eq!(config.codec.payload_reserve, 64);
        assert_eq!(config.jobs.default_timeout_secs, 10);
        assert_eq!(config.jobs.poll_interval_ms, 1000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = NetConfig::from_toml_str(
            r#"
[codec]
validate_header_constants = true

[jobs]
default_timeout_secs = 30
"#,
        )
        .unwrap();

        assert!(config.codec.validate_header_constants);
        assert_eq!(config.codec.max_message_size, CodecOptions::default().max_message_size);
        assert_eq!(config.jobs.default_timeout_secs, 30);
        assert_eq!(config.jobs.heartbeat_extension_secs, 10);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = NetConfig::default();
        config.logging.filter = Some("steam_codec=trace".to_string());
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(NetConfig::from_toml_str(&rendered).unwrap(), config);
    }
}
