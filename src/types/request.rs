//! Chat request body.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::source::Source;

/// Speaker of a history entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A prior turn sent as context with a new question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body posted to both the streaming and the non-streaming chat endpoint.
///
/// ```
/// use kulturarv::types::{ChatRequest, Source};
///
/// let request = ChatRequest::builder()
///     .message("Hva er Urnes stavkirke?")
///     .sources(vec![Source::Snl, Source::Riksantikvaren])
///     .build();
/// assert!(request.conversation_history.is_empty());
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    #[builder(into)]
    pub message: String,
    #[builder(default = Source::all())]
    pub sources: Vec<Source>,
    #[builder(default)]
    pub conversation_history: Vec<HistoryEntry>,
}
