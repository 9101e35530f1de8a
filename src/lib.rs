//! Kulturarv — streaming chat client for the Norwegian cultural-heritage
//! assistant.
//!
//! The assistant answers questions by consulting up to three knowledge
//! [`Source`](types::Source)s and streams its reply as server-sent events.
//! This crate opens that stream, decodes it into typed
//! [`StreamEvent`](types::StreamEvent)s and delivers them, in order, to a
//! [`StreamHandler`](stream::StreamHandler).
//!
//! # Quick Start
//!
//! ```no_run
//! use kulturarv::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> kulturarv::error::Result<()> {
//! let client = ChatClient::from_env()?;
//! let mut conversation = Conversation::new();
//! let request = conversation.begin_turn("Hva er Urnes stavkirke?", &Source::all())?;
//!
//! let cancel = CancellationToken::new();
//! let outcome = client
//!     .stream_message("my-token", &request, &mut conversation, &cancel)
//!     .await?;
//! println!("{outcome:?}: {}", conversation.messages()[1].content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod prelude;
pub mod stream;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
