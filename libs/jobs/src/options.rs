//! Job timing configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeouts applied to new jobs and the timeout poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOptions {
    /// Time a job may stay pending before it is cancelled
    pub default_timeout_secs: u64,
    /// Added to a job's timeout on every heartbeat
    pub heartbeat_extension_secs: u64,
    /// Period of the timeout poller
    pub poll_interval_ms: u64,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            default_timeout_secs: 10,
            heartbeat_extension_secs: 10,
            poll_interval_ms: 1000,
        }
    }
}

impl JobOptions {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    pub fn heartbeat_extension(&self) -> Duration {
        Duration::from_secs(self.heartbeat_extension_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
