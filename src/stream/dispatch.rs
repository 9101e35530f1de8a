//! Drives decoding and delivery over an async byte stream.

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{KulturarvError, Result};
use crate::types::{ChatResponse, StreamEvent};

use super::decoder::{parse_frame, FrameDecoder};
use super::handler::StreamHandler;
use super::state::{StreamOutcome, StreamState};

/// State machine that feeds decoded events to a handler.
///
/// The synchronous methods (`feed`, `finish`, `fail`, `cancel`) make the
/// machine usable without a runtime; [`Dispatcher::run`] wraps them in the
/// pull loop used for real connections.
pub struct Dispatcher<'h, H: StreamHandler + ?Sized> {
    handler: &'h mut H,
    decoder: FrameDecoder,
    state: StreamState,
    cancel: Option<CancellationToken>,
    outcome: Option<StreamOutcome>,
    dropped_frames: usize,
}

impl<'h, H: StreamHandler + ?Sized> Dispatcher<'h, H> {
    pub fn new(handler: &'h mut H) -> Self {
        Self {
            handler,
            decoder: FrameDecoder::new(),
            state: StreamState::Idle,
            cancel: None,
            outcome: None,
            dropped_frames: 0,
        }
    }

    /// Observe `token` between frames as well as while waiting for bytes.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// How the stream ended, once it has.
    pub fn outcome(&self) -> Option<&StreamOutcome> {
        self.outcome.as_ref()
    }

    /// Frames dropped because they failed to decode.
    pub fn dropped_frames(&self) -> usize {
        self.dropped_frames
    }

    /// Mark the request as sent.
    pub fn connect(&mut self) {
        if self.state == StreamState::Idle {
            self.transition(StreamState::Connecting);
        }
    }

    /// Mark the response headers as received with a success status.
    pub fn connected(&mut self) {
        self.connect();
        if self.state == StreamState::Connecting {
            self.transition(StreamState::Streaming);
        }
    }

    /// Decode one chunk and deliver every event it completes.
    ///
    /// Returns `false` once the stream has reached a terminal state and no
    /// further chunks should be pulled.
    pub fn feed(&mut self, chunk: &[u8]) -> bool {
        self.connected();
        if self.state.is_terminal() {
            return false;
        }

        for line in self.decoder.push(chunk) {
            if !self.deliver_line(&line) {
                return false;
            }
        }
        true
    }

    /// Handle end of body: flush the unterminated final line, then close.
    pub fn finish(&mut self) -> StreamOutcome {
        self.connected();
        if !self.state.is_terminal() {
            if let Some(line) = self.decoder.finish() {
                self.deliver_line(&line);
            }
        }
        if !self.state.is_terminal() {
            debug!("stream ended without a terminal frame");
            self.handler.on_end();
            self.close(StreamState::Done, StreamOutcome::Ended);
        }
        self.current_outcome()
    }

    /// Handle a transport fault after streaming began.
    ///
    /// The fault reaches the handler as an `error` event, the same way an
    /// error frame from the server does.
    pub fn fail(&mut self, message: impl Into<String>) -> StreamOutcome {
        self.connect();
        if !self.state.is_terminal() {
            let message = message.into();
            self.handler.on_event(&StreamEvent::Error {
                message: message.clone(),
            });
            self.close(StreamState::Errored, StreamOutcome::Errored(message));
        }
        self.current_outcome()
    }

    /// Stop silently. No handler method is invoked.
    pub fn cancel(&mut self) -> StreamOutcome {
        if !self.state.is_terminal() {
            debug!(state = %self.state, "stream cancelled");
            self.close(StreamState::Cancelled, StreamOutcome::Cancelled);
        }
        self.current_outcome()
    }

    /// Pull chunks from `stream` until it ends, a terminal frame arrives or
    /// the cancellation token fires. The stream is dropped on every exit
    /// path, releasing the underlying connection.
    pub async fn run<S, B, E>(mut self, stream: S) -> StreamOutcome
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let cancel = self.cancel.clone().unwrap_or_else(CancellationToken::new);
        self.connected();
        futures::pin_mut!(stream);

        while !self.state.is_terminal() {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = stream.next() => Some(next),
            };

            match next {
                None => {
                    self.cancel();
                }
                Some(Some(Ok(chunk))) => {
                    self.feed(chunk.as_ref());
                }
                Some(Some(Err(err))) => {
                    warn!(error = %err, "stream transport failed");
                    self.fail(err.to_string());
                }
                Some(None) => {
                    self.finish();
                }
            }
        }

        self.current_outcome()
    }

    /// Returns `false` when delivery must stop.
    fn deliver_line(&mut self, line: &str) -> bool {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            self.cancel();
            return false;
        }

        let event = match parse_frame(line) {
            None => return true,
            Some(Ok(event)) => event,
            Some(Err(err)) => {
                self.dropped_frames += 1;
                warn!(error = %err, "dropping stream frame");
                return true;
            }
        };

        self.handler.on_event(&event);

        match event {
            StreamEvent::Done { .. } => {
                self.close(StreamState::Done, StreamOutcome::Completed);
                false
            }
            StreamEvent::Error { message } => {
                self.close(StreamState::Errored, StreamOutcome::Errored(message));
                false
            }
            _ => true,
        }
    }

    fn close(&mut self, state: StreamState, outcome: StreamOutcome) {
        self.transition(state);
        self.outcome = Some(outcome);
    }

    fn transition(&mut self, next: StreamState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal stream transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "stream state");
        self.state = next;
    }

    fn current_outcome(&self) -> StreamOutcome {
        self.outcome.clone().unwrap_or(StreamOutcome::Ended)
    }
}

/// Dispatch every event in `stream` to `handler`.
///
/// Convenience wrapper over [`Dispatcher::run`] for callers that already
/// hold an open byte stream.
pub async fn dispatch<S, B, E, H>(
    stream: S,
    handler: &mut H,
    cancel: &CancellationToken,
) -> StreamOutcome
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    H: StreamHandler + ?Sized,
{
    Dispatcher::new(handler)
        .with_cancellation(cancel.clone())
        .run(stream)
        .await
}

/// Pull-based alternative to [`dispatch`]: yields decoded events.
///
/// Undecodable frames are logged and skipped. The stream ends after a
/// `done` or `error` event, or with one `Err` on a transport fault.
pub fn decode_events<S, B, E>(stream: S) -> BoxStream<'static, Result<StreamEvent>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<KulturarvError> + Send + 'static,
{
    let events = async_stream::stream! {
        let mut decoder = FrameDecoder::new();
        futures::pin_mut!(stream);

        'read: loop {
            let (lines, eof) = match stream.next().await {
                Some(Ok(chunk)) => (decoder.push(chunk.as_ref()), false),
                Some(Err(err)) => {
                    yield Err(err.into());
                    break;
                }
                None => (decoder.finish().into_iter().collect::<Vec<_>>(), true),
            };

            for line in lines {
                match parse_frame(&line) {
                    None => {}
                    Some(Err(err)) => warn!(error = %err, "dropping stream frame"),
                    Some(Ok(event)) => {
                        let terminal = event.is_terminal();
                        yield Ok(event);
                        if terminal {
                            break 'read;
                        }
                    }
                }
            }

            if eof {
                break;
            }
        }
    };
    Box::pin(events)
}

/// Drain `events` into the final response.
///
/// An `error` event becomes [`KulturarvError::Stream`], as does a stream
/// that ends without `done`. Transport faults pass through unchanged.
pub async fn collect_response<S>(events: S) -> Result<ChatResponse>
where
    S: Stream<Item = Result<StreamEvent>>,
{
    futures::pin_mut!(events);
    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::Done { response } => return Ok(*response),
            StreamEvent::Error { message } => return Err(KulturarvError::Stream(message)),
            other => debug!(kind = other.kind(), "skipping event while collecting"),
        }
    }
    Err(KulturarvError::Stream("stream ended without a response".into()))
}
