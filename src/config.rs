//! Client configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables shared by every view of a client session.
///
/// Missing keys fall back to their defaults:
///
/// ```json
/// { "feature_ttl_secs": 300, "notify_failures": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// How long a company's enabled-features list is served from cache.
    pub feature_ttl_secs: u64,
    /// Raise user-visible notices when a mutation is rolled back.
    pub notify_failures: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            feature_ttl_secs: 300,
            notify_failures: true,
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn feature_ttl(&self) -> Duration {
        Duration::from_secs(self.feature_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid client config: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError(err.to_string())
    }
}
