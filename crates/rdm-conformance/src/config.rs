use crate::error::{ConformanceError, Result};
use crate::test_case::DeviceTarget;
use rdm_conformance_protocol::{Uid, DEFAULT_FETCH_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

fn default_queued_message_limit() -> u32 {
    DEFAULT_FETCH_LIMIT
}

/// Settings for one conformance run against one responder.
///
/// ```toml
/// universe = 1
/// uid = "7a70:00000001"
/// broadcast_write_delay = "100ms"
/// queued_message_limit = 25
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub universe: u32,
    pub uid: Uid,
    #[serde(with = "humantime_serde", default)]
    pub broadcast_write_delay: Duration,
    /// Maximum GET QUEUED_MESSAGE requests per drain cycle.
    #[serde(default = "default_queued_message_limit")]
    pub queued_message_limit: u32,
}

impl RunnerConfig {
    #[must_use]
    pub fn new(universe: u32, uid: Uid) -> Self {
        Self {
            universe,
            uid,
            broadcast_write_delay: Duration::ZERO,
            queued_message_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    #[must_use]
    pub fn with_broadcast_write_delay(mut self, delay: Duration) -> Self {
        self.broadcast_write_delay = delay;
        self
    }

    #[must_use]
    pub fn with_queued_message_limit(mut self, limit: u32) -> Self {
        self.queued_message_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<&Self> {
        if self.queued_message_limit == 0 {
            return Err(ConformanceError::Configuration(
                "queued_message_limit must be greater than 0".to_string(),
            ));
        }

        if self.uid.is_broadcast() {
            return Err(ConformanceError::Configuration(
                "uid must address a single responder, not the broadcast UID".to_string(),
            ));
        }

        Ok(self)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConformanceError::Configuration(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    #[must_use]
    pub fn device_target(&self) -> DeviceTarget {
        DeviceTarget {
            universe: self.universe,
            uid: self.uid,
            broadcast_write_delay: self.broadcast_write_delay,
        }
    }
}
