use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_POLL_INTERVAL, DEFAULT_PREVIEW_LIMIT,
    DEFAULT_RECONNECT_DELAY, DEFAULT_SCROLL_THRESHOLD_PX, MIN_POLL_INTERVAL,
};
use crate::error::FeedError;

/// Runtime configuration for the notification subsystem.
/// Can be loaded from a JSON file; every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    pub base_url: String,
    pub page_size: usize,
    pub poll_interval_ms: u64,
    pub reconnect_delay_ms: u64,
    pub scroll_threshold_px: u32,
    pub preview_limit: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY.as_millis() as u64,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

impl CoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self, FeedError> {
        let content = std::fs::read_to_string(path).map_err(|e| FeedError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| FeedError::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.page_size == 0 {
            return Err(FeedError::Config {
                message: "pageSize must be greater than 0".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(FeedError::Config {
                message: "pollIntervalMs must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Override fields from `FEEDBELL_*` environment variables.
    /// Unparseable values are ignored.
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var("FEEDBELL_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        if let Some(size) = env_number::<usize>("FEEDBELL_PAGE_SIZE") {
            if size > 0 {
                self.page_size = size;
            }
        }
        if let Some(ms) = env_number::<u64>("FEEDBELL_POLL_INTERVAL_MS") {
            if ms > 0 {
                self.poll_interval_ms = ms;
            }
        }
        self
    }

    /// Never shorter than `MIN_POLL_INTERVAL`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Join a server path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring invalid numeric env override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.reconnect_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{"baseUrl": "https://cook.example", "pageSize": 5}"#;
        let config: CoreConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_url, "https://cook.example");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.poll_interval_ms, 15_000);
        assert_eq!(config.preview_limit, 5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pollIntervalMs": 3000}}"#).unwrap();
        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            CoreConfig::load(file.path()),
            Err(FeedError::Config { .. })
        ));
    }

    #[test]
    fn test_load_rejects_zero_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pollIntervalMs": 0}}"#).unwrap();
        assert!(matches!(
            CoreConfig::load(file.path()),
            Err(FeedError::Config { .. })
        ));

        let zero_page: CoreConfig = serde_json::from_str(r#"{"pageSize": 0}"#).unwrap();
        assert!(zero_page.validate().is_err());
        assert!(CoreConfig::default().validate().is_ok());
    }

    #[test]
    fn test_poll_interval_is_clamped() {
        let config: CoreConfig = serde_json::from_str(r#"{"pollIntervalMs": 0}"#).unwrap();
        assert_eq!(config.poll_interval(), MIN_POLL_INTERVAL);

        let config: CoreConfig = serde_json::from_str(r#"{"pollIntervalMs": 250}"#).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_url_join() {
        let config = CoreConfig::new("https://cook.example/");
        assert_eq!(
            config.url("/api/notifications"),
            "https://cook.example/api/notifications"
        );
    }
}
