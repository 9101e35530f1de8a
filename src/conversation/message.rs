//! A single chat message and the reducer that grows it from stream events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;
use uuid::Uuid;

use crate::types::{ChatResponse, Location, Role, SourceReference, StreamEvent};

/// Progress of one upstream lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToolState {
    Calling,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolStatus {
    pub tool: String,
    pub state: ToolState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// One chat message, owned by the consumer.
///
/// Assistant messages start open (`is_streaming`) and close on `done`,
/// `error`, [`Message::end`] or [`Message::cancel`]. Closed messages ignore further events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceReference>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub related_queries: Vec<String>,
    #[serde(default)]
    pub tools_used: Vec<String>,
    #[serde(default)]
    pub providers_consulted: Vec<String>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub model: Option<String>,
    /// Latest `status` note while streaming.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default)]
    pub tool_statuses: Vec<ToolStatus>,
}

impl Message {
    fn new(role: Role, content: String, is_streaming: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
            summary: None,
            sources: Vec::new(),
            locations: Vec::new(),
            related_queries: Vec::new(),
            tools_used: Vec::new(),
            providers_consulted: Vec::new(),
            processing_time_ms: None,
            model: None,
            status: None,
            error: None,
            is_streaming,
            tool_statuses: Vec::new(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), false)
    }

    /// An empty assistant message waiting for stream events.
    pub fn pending_assistant() -> Self {
        Self::new(Role::Assistant, String::new(), true)
    }

    /// A closed assistant message built from a non-streaming response.
    pub fn from_response(response: &ChatResponse) -> Self {
        let mut message = Self::pending_assistant();
        message.complete(response);
        message
    }

    /// Fold one event into the message. Returns `false` if it was ignored.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        if !self.is_streaming {
            debug!(kind = event.kind(), "ignoring event for closed message");
            return false;
        }

        match event {
            StreamEvent::Status { message } => self.status = Some(message.clone()),
            StreamEvent::ToolStart { tool, .. } => self.tool_statuses.push(ToolStatus {
                tool: tool.clone(),
                state: ToolState::Calling,
                preview: None,
            }),
            StreamEvent::ToolEnd {
                tool,
                success,
                preview,
            } => return self.resolve_tool(tool, *success, preview.clone()),
            StreamEvent::Token { content } => self.content.push_str(content),
            StreamEvent::Done { response } => self.complete(response),
            StreamEvent::Error { message } => {
                self.error = Some(message.clone());
                self.close();
            }
        }
        true
    }

    /// Close after cancellation, keeping whatever text arrived.
    pub fn cancel(&mut self) {
        self.close();
    }

    /// Close when the body ended without `done` or `error`, keeping
    /// whatever text arrived.
    pub fn end(&mut self) {
        if self.is_streaming {
            debug!(chars = self.content.len(), "reply ended without a response");
        }
        self.close();
    }

    /// Close with a failure that happened before any event arrived.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.close();
    }

    /// Tool lookups that have not finished yet.
    pub fn pending_tools(&self) -> impl Iterator<Item = &ToolStatus> {
        self.tool_statuses
            .iter()
            .filter(|s| s.state == ToolState::Calling)
    }

    /// Resolve the oldest still-calling entry for `tool`.
    ///
    /// Tool calls carry no id, so repeated calls to the same tool are
    /// matched first-in, first-out.
    fn resolve_tool(&mut self, tool: &str, success: bool, preview: Option<String>) -> bool {
        let Some(status) = self
            .tool_statuses
            .iter_mut()
            .find(|s| s.tool == tool && s.state == ToolState::Calling)
        else {
            debug!(tool, "tool_end without a matching tool_start");
            return false;
        };
        status.state = if success {
            ToolState::Completed
        } else {
            ToolState::Failed
        };
        status.preview = preview;
        true
    }

    fn complete(&mut self, response: &ChatResponse) {
        if !response.response.text.is_empty() {
            self.content = response.response.text.clone();
        }
        self.summary = response.response.summary.clone();
        self.sources = response.sources.clone();
        self.locations = response.locations.clone();
        self.related_queries = response.related_queries.clone();
        self.tools_used = response.metadata.tools_used.clone();
        self.providers_consulted = response.metadata.providers_consulted.clone();
        self.processing_time_ms = Some(response.metadata.processing_time_ms);
        self.model = Some(response.metadata.model.clone()).filter(|m| !m.is_empty());
        self.close();
    }

    fn close(&mut self) {
        self.is_streaming = false;
        self.status = None;
    }
}
