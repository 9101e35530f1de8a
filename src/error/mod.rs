//! Error types for the Kulturarv client.

pub mod category;

pub use category::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all client operations.
///
/// Cancellation is not an error: a cancelled stream ends with
/// [`StreamOutcome::Cancelled`](crate::stream::StreamOutcome::Cancelled),
/// never with an error.
#[derive(Error, Debug)]
pub enum KulturarvError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server ended a collected stream with an `error` frame, or the
    /// body closed before `done`.
    #[error("Stream error: {0}")]
    Stream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preference file error: {0}")]
    Toml(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl KulturarvError {
    /// Create an API error for a non-success status.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::Stream(_) => ErrorCategory::Server,
            Self::Configuration(_) | Self::InvalidArgument(_) => ErrorCategory::Configuration,
            Self::Toml(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
        }
    }

    /// Whether retrying the same request later might succeed.
    ///
    /// The client never retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server
        )
    }

    /// Whether the caller must obtain a new access token before retrying.
    pub fn requires_reauthentication(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::ProvideNewToken,
            ErrorCategory::RateLimit => RecoverySuggestion::WaitAndRetry,
            ErrorCategory::Network | ErrorCategory::Server => RecoverySuggestion::RetryLater,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            _ => RecoverySuggestion::ContactAdministrator,
        }
    }
}

impl From<toml::de::Error> for KulturarvError {
    fn from(error: toml::de::Error) -> Self {
        Self::Toml(error.to_string())
    }
}

impl From<toml::ser::Error> for KulturarvError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Toml(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, KulturarvError>;
