//! Structured chat response and service status.

use serde::{Deserialize, Serialize};

/// Final answer text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A citation backing the answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceReference {
    pub title: String,
    pub url: String,
    /// Provider identifier, e.g. `"snl"`.
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// A place mentioned in the answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Category, e.g. `"church"`.
    #[serde(rename = "type")]
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatResponseMetadata {
    #[serde(default)]
    pub tools_used: Vec<String>,
    #[serde(default)]
    pub providers_consulted: Vec<String>,
    #[serde(default)]
    pub processing_time_ms: u64,
    #[serde(default)]
    pub model: String,
}

/// Full structured result of one chat turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: ResponseContent,
    #[serde(default)]
    pub sources: Vec<SourceReference>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub related_queries: Vec<String>,
    #[serde(default)]
    pub metadata: ChatResponseMetadata,
}

/// Availability report from the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatStatus {
    pub enabled: bool,
    pub rate_limit_per_hour: u32,
    #[serde(default)]
    pub sources_available: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming_supported: Option<bool>,
}
