//! Consumer-side conversation state built from stream events.

pub mod message;

pub use message::{Message, ToolState, ToolStatus};

use tracing::debug;

use crate::error::{KulturarvError, Result};
use crate::stream::StreamHandler;
use crate::types::{ChatRequest, ChatResponse, HistoryEntry, Role, Source, StreamEvent};

/// Messages sent as context with each new question.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Ordered chat messages with at most one open assistant reply.
///
/// Implements [`StreamHandler`], so it can be handed straight to
/// [`ChatClient::stream_message`](crate::client::ChatClient::stream_message).
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    history_limit: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether an assistant reply is still streaming.
    pub fn is_busy(&self) -> bool {
        self.current().is_some()
    }

    /// The open assistant reply, if any.
    pub fn current(&self) -> Option<&Message> {
        self.messages
            .last()
            .filter(|m| m.role == Role::Assistant && m.is_streaming)
    }

    fn current_mut(&mut self) -> Option<&mut Message> {
        self.messages
            .last_mut()
            .filter(|m| m.role == Role::Assistant && m.is_streaming)
    }

    /// The last `history_limit` messages as request context.
    ///
    /// Unlike a plain last-N slice, messages with no text (e.g. replies
    /// that failed before any token) are dropped before the limit is
    /// applied.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .messages
            .iter()
            .rev()
            .filter(|m| !m.content.is_empty())
            .take(self.history_limit)
            .map(|m| HistoryEntry {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();
        entries.reverse();
        entries
    }

    /// Start a turn: record the question, open an assistant reply and
    /// return the request to send.
    pub fn begin_turn(&mut self, text: &str, sources: &[Source]) -> Result<ChatRequest> {
        let text = text.trim();
        if text.is_empty() {
            return Err(KulturarvError::InvalidArgument(
                "message must not be empty".into(),
            ));
        }
        if sources.is_empty() {
            return Err(KulturarvError::InvalidArgument(
                "select at least one source".into(),
            ));
        }
        if self.is_busy() {
            return Err(KulturarvError::InvalidArgument(
                "a reply is still streaming".into(),
            ));
        }

        let request = ChatRequest::builder()
            .message(text)
            .sources(sources.to_vec())
            .conversation_history(self.history())
            .build();

        self.messages.push(Message::user(text));
        self.messages.push(Message::pending_assistant());
        debug!(messages = self.messages.len(), "turn started");
        Ok(request)
    }

    /// Fold an event into the open reply. Returns `false` if there is none
    /// or the message ignored it.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        match self.current_mut() {
            Some(message) => message.apply(event),
            None => {
                debug!(kind = event.kind(), "no open reply for event");
                false
            }
        }
    }

    /// Finish the open reply with a non-streaming response.
    pub fn complete_turn(&mut self, response: &ChatResponse) {
        if let Some(message) = self.current_mut() {
            message.apply(&StreamEvent::Done {
                response: Box::new(response.clone()),
            });
        }
    }

    /// Close the open reply silently, keeping partial text.
    pub fn cancel_turn(&mut self) {
        if let Some(message) = self.current_mut() {
            message.cancel();
        }
    }

    /// Close the open reply after the body ended without a response.
    pub fn end_turn(&mut self) {
        if let Some(message) = self.current_mut() {
            message.end();
        }
    }

    /// Close the open reply with an error raised before streaming began.
    pub fn fail_turn(&mut self, error: &KulturarvError) {
        if let Some(message) = self.current_mut() {
            message.fail(error.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl StreamHandler for Conversation {
    fn on_event(&mut self, event: &StreamEvent) {
        self.apply(event);
    }

    fn on_end(&mut self) {
        self.end_turn();
    }
}
