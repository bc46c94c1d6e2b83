//! Runtime configuration for the sentinel.

use std::time::Duration;

use crate::backoff::BackoffConfig;
use crate::error::{Result, SentinelError};

/// Immutable runtime configuration.
///
/// Built once at startup and passed into every component; no component reads
/// ambient state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the cluster management API.
    pub base_url: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// When true, mutating calls are logged instead of sent.
    pub dry_run: bool,
    /// Delay between reconciliation ticks.
    pub poll_interval: Duration,
    /// Timeout applied to each management API request.
    pub request_timeout: Duration,
    /// Cluster-wide thrash budget parameters.
    pub cluster_backoff: BackoffConfig,
    /// Per-node thrash budget parameters.
    pub node_backoff: BackoffConfig,
}

impl Config {
    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(SentinelError::InvalidConfig {
                field: "base_url".to_string(),
                reason: "management API URL must be set".to_string(),
            });
        }

        if self.username.is_empty() || self.password.is_empty() {
            return Err(SentinelError::InvalidConfig {
                field: "credentials".to_string(),
                reason: "username and password must be set".to_string(),
            });
        }

        if self.poll_interval.is_zero() {
            return Err(SentinelError::InvalidConfig {
                field: "poll_interval".to_string(),
                reason: "poll interval must be non-zero".to_string(),
            });
        }

        if self.cluster_backoff.limit == 0 || self.node_backoff.limit == 0 {
            return Err(SentinelError::InvalidConfig {
                field: "backoff.limit".to_string(),
                reason: "attempt limits must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            dry_run: false,
            poll_interval: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            cluster_backoff: BackoffConfig::cluster(),
            node_backoff: BackoffConfig::node(),
        }
    }
}
