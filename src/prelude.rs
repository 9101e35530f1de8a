//! Convenience re-exports for common use.

pub use crate::client::ChatClient;
pub use crate::config::{ClientConfig, Language, Preferences};
pub use crate::conversation::{Conversation, Message, ToolState, ToolStatus};
pub use crate::error::{KulturarvError, Result};
pub use crate::stream::{StreamCallbacks, StreamHandler, StreamOutcome, StreamState};
pub use crate::types::{ChatRequest, ChatResponse, Source, StreamEvent};
