//! Tool progress tracking when the same tool runs more than once.
//!
//! Tool events carry only a name, so a `tool_end` is matched to the oldest
//! `tool_start` of that name that is still calling.

use kulturarv::conversation::{Conversation, ToolState};
use kulturarv::stream::Dispatcher;
use kulturarv::types::Source;
use pretty_assertions::assert_eq;

fn frame(json: &str) -> String {
    format!("data: {json}\n\n")
}

#[test]
fn one_end_for_two_starts_completes_only_the_first() {
    let body = [
        frame(r#"{"type":"tool_start","tool":"wikipedia-search","arguments":{"query":"Bryggen"}}"#),
        frame(r#"{"type":"tool_start","tool":"wikipedia-search","arguments":{"query":"Nidaros"}}"#),
        frame(r#"{"type":"tool_end","tool":"wikipedia-search","success":true,"preview":"Bryggen er…"}"#),
    ]
    .concat();

    let mut conversation = Conversation::new();
    conversation
        .begin_turn("Bryggen og Nidaros", &Source::all())
        .unwrap();
    {
        let mut dispatcher = Dispatcher::new(&mut conversation);
        dispatcher.feed(body.as_bytes());
    }

    let reply = conversation.current().expect("reply still open");
    let summary: Vec<_> = reply
        .tool_statuses
        .iter()
        .map(|s| (s.tool.as_str(), s.state, s.preview.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("wikipedia-search", ToolState::Completed, Some("Bryggen er…")),
            ("wikipedia-search", ToolState::Calling, None),
        ]
    );
}

#[test]
fn interleaved_tools_resolve_by_name() {
    let body = [
        frame(r#"{"type":"tool_start","tool":"snl-search","arguments":{}}"#),
        frame(r#"{"type":"tool_start","tool":"riksantikvaren-nearby","arguments":{"lat":63.43,"lng":10.39}}"#),
        frame(r#"{"type":"tool_end","tool":"riksantikvaren-nearby","success":false}"#),
        frame(r#"{"type":"tool_end","tool":"snl-search","success":true}"#),
    ]
    .concat();

    let mut conversation = Conversation::new();
    conversation.begin_turn("Trondheim", &Source::all()).unwrap();
    {
        let mut dispatcher = Dispatcher::new(&mut conversation);
        dispatcher.feed(body.as_bytes());
    }

    let states: Vec<_> = conversation
        .current()
        .unwrap()
        .tool_statuses
        .iter()
        .map(|s| s.state)
        .collect();
    assert_eq!(states, vec![ToolState::Completed, ToolState::Failed]);
}
