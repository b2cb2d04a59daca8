use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Whole-request timeout in seconds. Unset means no timeout.
    pub timeout_secs: Option<u64>,

    /// User agent string to send
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: concat!("stencil/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetcherConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = FetcherConfig::default();
        assert!(config.timeout_secs.is_none());
        assert!(config.timeout().is_none());
        assert!(config.user_agent.starts_with("stencil/"));
    }

    #[test]
    fn test_timeout_duration() {
        let config = FetcherConfig {
            timeout_secs: Some(45),
            ..Default::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_secs(45)));
    }
}
