//! Consumer-facing callbacks.

use serde_json::{Map, Value};

use crate::types::{ChatResponse, StreamEvent};

/// Receives decoded events, one call per event, in arrival order.
///
/// Every method defaults to a no-op, so implementors only override what
/// they care about. Calls never overlap and the next chunk is not pulled
/// until the current call returns, so implementations can mutate their own
/// state without locking.
///
/// Once the body is being read, exactly one of `on_done`, `on_error` and
/// `on_end` closes the stream unless it is cancelled. A cancelled stream
/// gets no further calls.
pub trait StreamHandler {
    fn on_status(&mut self, _message: &str) {}

    fn on_tool_start(&mut self, _tool: &str, _arguments: &Map<String, Value>) {}

    fn on_tool_end(&mut self, _tool: &str, _success: bool, _preview: Option<&str>) {}

    fn on_token(&mut self, _content: &str) {}

    fn on_done(&mut self, _response: &ChatResponse) {}

    /// Also called for transport faults once streaming has begun.
    fn on_error(&mut self, _message: &str) {}

    /// The body ended without a `done` or `error` frame.
    fn on_end(&mut self) {}

    /// Route an event to the matching method.
    ///
    /// Override this to observe whole events instead of fields.
    fn on_event(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Status { message } => self.on_status(message),
            StreamEvent::ToolStart { tool, arguments } => self.on_tool_start(tool, arguments),
            StreamEvent::ToolEnd {
                tool,
                success,
                preview,
            } => self.on_tool_end(tool, *success, preview.as_deref()),
            StreamEvent::Token { content } => self.on_token(content),
            StreamEvent::Done { response } => self.on_done(response),
            StreamEvent::Error { message } => self.on_error(message),
        }
    }
}

type StatusFn<'a> = Box<dyn FnMut(&str) + 'a>;
type ToolStartFn<'a> = Box<dyn FnMut(&str, &Map<String, Value>) + 'a>;
type ToolEndFn<'a> = Box<dyn FnMut(&str, bool, Option<&str>) + 'a>;
type DoneFn<'a> = Box<dyn FnMut(&ChatResponse) + 'a>;
type EndFn<'a> = Box<dyn FnMut() + 'a>;

/// Closure-based [`StreamHandler`]; unset callbacks are skipped.
///
/// ```
/// use kulturarv::stream::StreamCallbacks;
///
/// let mut text = String::new();
/// let callbacks = StreamCallbacks::new().token(|t| text.push_str(t));
/// # drop(callbacks);
/// ```
#[derive(Default)]
pub struct StreamCallbacks<'a> {
    status: Option<StatusFn<'a>>,
    tool_start: Option<ToolStartFn<'a>>,
    tool_end: Option<ToolEndFn<'a>>,
    token: Option<StatusFn<'a>>,
    done: Option<DoneFn<'a>>,
    error: Option<StatusFn<'a>>,
    end: Option<EndFn<'a>>,
}

impl<'a> StreamCallbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, f: impl FnMut(&str) + 'a) -> Self {
        self.status = Some(Box::new(f));
        self
    }

    pub fn tool_start(mut self, f: impl FnMut(&str, &Map<String, Value>) + 'a) -> Self {
        self.tool_start = Some(Box::new(f));
        self
    }

    pub fn tool_end(mut self, f: impl FnMut(&str, bool, Option<&str>) + 'a) -> Self {
        self.tool_end = Some(Box::new(f));
        self
    }

    pub fn token(mut self, f: impl FnMut(&str) + 'a) -> Self {
        self.token = Some(Box::new(f));
        self
    }

    pub fn done(mut self, f: impl FnMut(&ChatResponse) + 'a) -> Self {
        self.done = Some(Box::new(f));
        self
    }

    pub fn error(mut self, f: impl FnMut(&str) + 'a) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn end(mut self, f: impl FnMut() + 'a) -> Self {
        self.end = Some(Box::new(f));
        self
    }
}

impl StreamHandler for StreamCallbacks<'_> {
    fn on_status(&mut self, message: &str) {
        if let Some(f) = self.status.as_mut() {
            f(message);
        }
    }

    fn on_tool_start(&mut self, tool: &str, arguments: &Map<String, Value>) {
        if let Some(f) = self.tool_start.as_mut() {
            f(tool, arguments);
        }
    }

    fn on_tool_end(&mut self, tool: &str, success: bool, preview: Option<&str>) {
        if let Some(f) = self.tool_end.as_mut() {
            f(tool, success, preview);
        }
    }

    fn on_token(&mut self, content: &str) {
        if let Some(f) = self.token.as_mut() {
            f(content);
        }
    }

    fn on_done(&mut self, response: &ChatResponse) {
        if let Some(f) = self.done.as_mut() {
            f(response);
        }
    }

    fn on_error(&mut self, message: &str) {
        if let Some(f) = self.error.as_mut() {
            f(message);
        }
    }

    fn on_end(&mut self) {
        if let Some(f) = self.end.as_mut() {
            f();
        }
    }
}
