//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Server,
    Api,
    Protocol,
    Configuration,
    Serialization,
    Storage,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    ProvideNewToken,
    WaitAndRetry,
    RetryLater,
    CheckConfiguration,
    ContactAdministrator,
}
