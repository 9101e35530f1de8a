//! Events carried by the chat SSE stream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::response::ChatResponse;

/// One decoded `data:` frame.
///
/// The `type` field inside the JSON payload selects the variant; any other
/// value fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Informational progress note.
    Status { message: String },
    /// An upstream lookup began. Arguments are tool-specific and unvalidated.
    ToolStart {
        tool: String,
        #[serde(default)]
        arguments: Map<String, Value>,
    },
    /// An upstream lookup finished.
    ToolEnd {
        tool: String,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preview: Option<String>,
    },
    /// Incremental slice of assistant output.
    Token { content: String },
    /// Terminal success payload.
    Done { response: Box<ChatResponse> },
    /// Terminal failure reported by the server.
    Error { message: String },
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }

    /// Wire name of the variant, as found in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Status { .. } => "status",
            StreamEvent::ToolStart { .. } => "tool_start",
            StreamEvent::ToolEnd { .. } => "tool_end",
            StreamEvent::Token { .. } => "token",
            StreamEvent::Done { .. } => "done",
            StreamEvent::Error { .. } => "error",
        }
    }
}
