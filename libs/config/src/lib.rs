//! # Steam Networking Configuration
//!
//! Loads [`NetConfig`] (logging, codec and job settings) from an optional TOML
//! file with `STEAM_` environment overrides, and installs the tracing
//! subscriber for binaries.
//!
//! ## Usage
//!
//! ```rust
//! use steam_config::NetConfig;
//!
//! let config = NetConfig::from_toml_str("[codec]\nvalidate_header_constants = true\n").unwrap();
//! assert!(config.codec.validate_header_constants);
//! assert_eq!(config.jobs.default_timeout_secs, 10);
//! ```

pub mod logging;
pub mod net_config;

pub use logging::init_logging;
pub use net_config::{expand_path, LoggingConfig, NetConfig, ENV_PREFIX};
