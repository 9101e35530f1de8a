//! Client configuration and persisted user preferences.

pub mod preferences;
pub mod store;

pub use preferences::{Language, Preferences, StoredPreferences};
pub use store::{FileStore, MemoryStore, PreferenceStore};

use std::time::Duration;

/// Production endpoint of the Kulturarv assistant service.
pub const DEFAULT_BASE_URL: &str =
    "https://kulturarv-mcp-server.gentleplant-37ecd527.swedencentral.azurecontainerapps.io";

/// Connection settings for [`ChatClient`](crate::client::ChatClient).
///
/// There is deliberately no overall request timeout: stream bodies are
/// unbounded. Use [`cancel_after`](crate::util::cancel_after) for deadlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("kulturarv/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `KULTURARV_BASE_URL` (a `.env` file is read if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        if let Ok(url) = std::env::var("KULTURARV_BASE_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        config
    }
}
