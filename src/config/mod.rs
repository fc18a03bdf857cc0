//! Configuration module for the labdesk client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

use reqwest::Url;

use crate::errors::ClientError;

/// Default page size used when a screen does not set its own.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend
    pub api_url: Url,
    /// Path to the persisted session file
    pub session_path: PathBuf,
    /// Fallback page size for list screens
    pub page_size: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let raw_url =
            env::var("LABDESK_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string());
        let api_url = Url::parse(&raw_url)
            .map_err(|e| ClientError::Config(format!("Invalid LABDESK_API_URL: {}", e)))?;

        let session_path = env::var("LABDESK_SESSION_PATH")
            .unwrap_or_else(|_| "./data/session.json".to_string())
            .into();

        let page_size = match env::var("LABDESK_PAGE_SIZE") {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ClientError::Config(format!(
                        "Invalid LABDESK_PAGE_SIZE: {}",
                        raw
                    )))
                }
            },
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        let log_level = env::var("LABDESK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_url,
            session_path,
            page_size,
            log_level,
        })
    }

    /// Configuration pointing at an explicit backend, used by tests and tooling.
    pub fn for_api(api_url: Url) -> Self {
        Self {
            api_url,
            session_path: PathBuf::from("./data/session.json"),
            page_size: DEFAULT_PAGE_SIZE,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases share one test so they never race on the process environment.
    #[test]
    fn test_config_from_env() {
        env::remove_var("LABDESK_API_URL");
        env::remove_var("LABDESK_SESSION_PATH");
        env::remove_var("LABDESK_PAGE_SIZE");
        env::remove_var("LABDESK_LOG_LEVEL");

        let config = Config::from_env().unwrap();

        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8000/api");
        assert_eq!(config.session_path, PathBuf::from("./data/session.json"));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.log_level, "info");

        env::set_var("LABDESK_PAGE_SIZE", "0");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        env::remove_var("LABDESK_PAGE_SIZE");
    }
}
