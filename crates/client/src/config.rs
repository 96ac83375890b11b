//! Client configuration.

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL and per-request timeout for the API client.
///
/// A request that exceeds the timeout fails as a network error; the inbound
/// stage never treats that as an authentication failure.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configuration from `PETGET_API_URL` and `PETGET_API_TIMEOUT_SECS`,
    /// defaulting where unset. An unparseable timeout is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = match std::env::var("PETGET_API_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        };

        if let Ok(raw) = std::env::var("PETGET_API_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => tracing::warn!("ignoring invalid PETGET_API_TIMEOUT_SECS={raw}"),
            }
        }

        config
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_local_backend() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn with_timeout_overrides_default() {
        let config = ApiConfig::new("https://api.petget.com").with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
