//! Session configuration

use crate::client::player::DEFAULT_SNAPSHOT_QUALITY;
use crate::event::bus::DEFAULT_CAPACITY;

/// Session configuration options
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Deployment environment tag, reported by [`LiveSession::env`]
    ///
    /// [`LiveSession::env`]: super::LiveSession::env
    pub env: String,

    /// Unread events buffered per subscriber before it lags
    pub event_capacity: usize,

    /// Quality passed to host snapshots ("raw" or "compressed")
    pub snapshot_quality: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            env: "prod".to_string(),
            event_capacity: DEFAULT_CAPACITY,
            snapshot_quality: DEFAULT_SNAPSHOT_QUALITY.to_string(),
        }
    }
}

impl SessionConfig {
    /// Create a config for an environment
    pub fn with_env(env: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            ..Default::default()
        }
    }

    /// Set the environment tag
    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = env.into();
        self
    }

    /// Set the per-subscriber event buffer (at least 1)
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Set the snapshot quality
    pub fn snapshot_quality(mut self, quality: impl Into<String>) -> Self {
        self.snapshot_quality = quality.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();

        assert_eq!(config.env, "prod");
        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.snapshot_quality, "raw");
    }

    #[test]
    fn test_with_env() {
        let config = SessionConfig::with_env("test");

        assert_eq!(config.env, "test");
        assert_eq!(config.event_capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn test_builder_event_capacity_floor() {
        let config = SessionConfig::default().event_capacity(0);

        assert_eq!(config.event_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = SessionConfig::default()
            .env("dev")
            .event_capacity(16)
            .snapshot_quality("compressed");

        assert_eq!(config.env, "dev");
        assert_eq!(config.event_capacity, 16);
        assert_eq!(config.snapshot_quality, "compressed");
    }
}
