use serde::{Deserialize, Serialize};

/// Base URL used when no API location is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Number of hosts requested from the search API per dashboard refresh
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the dashboard server binds to
    pub bind: String,

    /// Port for the dashboard server
    pub port: u16,

    /// Base URL of the external host search API
    pub api_base_url: String,

    /// Result limit sent with every dashboard search
    pub search_limit: usize,

    /// Idle time after which a dashboard session is dropped (seconds)
    pub session_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            session_ttl_secs: 1800,
        }
    }
}

impl AppConfig {
    /// Config pointing at a given API, everything else default
    pub fn with_api_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }
}
