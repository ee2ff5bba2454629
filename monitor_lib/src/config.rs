//! Client configuration: base URL, API key, request timeout.

use crate::error::Error;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`crate::Client`]. Immutable once the client is built.
#[derive(Debug, Clone)]
pub struct Config {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl Config {
    /// Create a configuration with the default 30 s timeout.
    ///
    /// `base_url` is the root of the monitoring API
    /// (e.g. `https://monitor.example.com`); a single trailing slash is
    /// stripped. Validation happens when the client is constructed.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject empty base URL or API key.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url is required".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("api_key is required".to_string()));
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }
}

fn normalize_base_url(url: String) -> String {
    match url.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let c = Config::new("http://localhost:5000/", "pm_key");
        assert_eq!(c.base_url(), "http://localhost:5000");
    }

    #[test]
    fn base_url_without_slash_unchanged() {
        let c = Config::new("http://localhost:5000", "pm_key");
        assert_eq!(c.base_url(), "http://localhost:5000");
    }

    #[test]
    fn only_one_slash_is_stripped() {
        let c = Config::new("http://localhost:5000//", "pm_key");
        assert_eq!(c.base_url(), "http://localhost:5000/");
    }

    #[test]
    fn empty_base_url_rejected() {
        let c = Config::new("", "pm_key");
        assert!(matches!(c.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn blank_api_key_rejected() {
        let c = Config::new("http://localhost:5000", "  ");
        assert!(matches!(c.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn default_timeout_is_30s() {
        let c = Config::new("http://localhost:5000", "pm_key");
        assert_eq!(c.timeout_duration(), Duration::from_secs(30));
    }
}
