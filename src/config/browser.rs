use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for loading pages over HTTP or through headless Chrome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Page load timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Wait time after page load before the first snapshot in milliseconds (default: 1000)
    pub wait_after_load_ms: u64,

    /// How often the live page is re-serialized in milliseconds (default: 1000)
    pub refresh_interval_ms: u64,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 30,
            wait_after_load_ms: 1000,
            refresh_interval_ms: 1000,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl BrowserConfig {
    /// Get the page load timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the wait time after load as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }

    /// Get the snapshot refresh interval as a Duration, never below 100ms
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.wait_after_load_ms, 1000);
        assert_eq!(config.refresh_interval_ms, 1000);
        assert!(config.user_agent.is_some());
    }

    #[test]
    fn test_durations() {
        let config = BrowserConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.wait_after_load(), Duration::from_millis(1000));
    }

    #[test]
    fn test_refresh_interval_has_floor() {
        let config = BrowserConfig {
            refresh_interval_ms: 5,
            ..Default::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_millis(100));
    }
}
