//! Shared test helpers: a recording handler and SSE fixtures.

#![allow(dead_code)]

use kulturarv::stream::StreamHandler;
use kulturarv::types::StreamEvent;
use tokio_util::sync::CancellationToken;

/// Records every delivered event.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<StreamEvent>,
}

impl StreamHandler for Recorder {
    fn on_event(&mut self, event: &StreamEvent) {
        self.events.push(event.clone());
    }
}

impl Recorder {
    pub fn tokens(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Token { content } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(StreamEvent::kind).collect()
    }
}

/// Cancels a token once it has seen `after` token events.
pub struct CancelAfterTokens {
    pub recorder: Recorder,
    pub after: usize,
    pub cancel: CancellationToken,
}

impl StreamHandler for CancelAfterTokens {
    fn on_event(&mut self, event: &StreamEvent) {
        self.recorder.on_event(event);
        if self.recorder.tokens().len() == self.after {
            self.cancel.cancel();
        }
    }
}

pub const DONE_RESPONSE: &str = r#"{"response":{"text":"Hei verden","summary":"kort"},"sources":[{"title":"Bryggen","url":"https://snl.no/Bryggen","provider":"snl","snippet":"Hanseatisk kontor"}],"locations":[{"name":"Bryggen","lat":60.397,"lng":5.324,"type":"site"}],"related_queries":["Hva var Hansaforbundet?"],"metadata":{"tools_used":["snl-search"],"providers_consulted":["snl"],"processing_time_ms":842,"model":"gpt-4o"}}"#;

pub fn frame(json: &str) -> String {
    format!("data: {json}\n\n")
}

pub fn token_frame(content: &str) -> String {
    frame(&serde_json::json!({"type": "token", "content": content}).to_string())
}

pub fn done_frame() -> String {
    frame(&format!(r#"{{"type":"done","response":{DONE_RESPONSE}}}"#))
}

/// A realistic body exercising every frame kind plus noise the decoder
/// must skip.
pub fn full_body() -> String {
    let mut body = String::new();
    body.push_str("event: status\n");
    body.push_str(&frame(r#"{"type":"status","message":"Søker i kildene…"}"#));
    body.push_str("event: tool_start\r\n");
    body.push_str(&frame(
        r#"{"type":"tool_start","tool":"snl-search","arguments":{"query":"Bryggen i Bergen","limit":3}}"#,
    ));
    body.push_str(": keep-alive\n\n");
    body.push_str(&frame(
        r#"{"type":"tool_end","tool":"snl-search","success":true,"preview":"Bryggen er…"}"#,
    ));
    body.push_str("data: {this is not json}\n\n");
    body.push_str("data:\n\n");
    body.push_str("   \n");
    body.push_str(&token_frame("Hei"));
    body.push_str(&token_frame(" verden – æøå"));
    body.push_str(&token_frame(""));
    body.push_str(&done_frame());
    body
}
