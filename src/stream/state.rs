//! Lifecycle of one streaming exchange.

use strum::Display;

/// Where a stream is in its lifecycle.
///
/// | From         | To                                  | Trigger                              |
/// |--------------|-------------------------------------|--------------------------------------|
/// | `Idle`       | `Connecting`                        | request sent                         |
/// | `Idle`       | `Cancelled`                         | token fired before the request       |
/// | `Connecting` | `Streaming`                         | success status received              |
/// | `Connecting` | `Errored`                           | non-success status or network fault  |
/// | `Connecting` | `Cancelled`                         | token fired before headers           |
/// | `Streaming`  | `Done`                              | `done` frame, or end of body         |
/// | `Streaming`  | `Errored`                           | `error` frame or mid-read fault      |
/// | `Streaming`  | `Cancelled`                         | token fired                          |
///
/// `Done`, `Errored` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StreamState {
    Idle,
    Connecting,
    Streaming,
    Done,
    Errored,
    Cancelled,
}

impl StreamState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Errored | Self::Cancelled)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: StreamState) -> bool {
        use StreamState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Idle, Cancelled)
                | (Connecting, Streaming)
                | (Connecting, Errored)
                | (Connecting, Cancelled)
                | (Streaming, Done)
                | (Streaming, Errored)
                | (Streaming, Cancelled)
        )
    }
}

/// How a dispatched stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// A `done` frame was delivered.
    Completed,
    /// An `error` frame or a transport fault ended the stream; the message
    /// was passed to `on_error`.
    Errored(String),
    /// The cancellation token fired. No terminal callback was invoked.
    Cancelled,
    /// The body ended without a `done` or `error` frame.
    Ended,
}

impl StreamOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}
