//! Decoder and dispatcher behavior over chunked input.

mod common;

use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use kulturarv::stream::{decode_events, dispatch, Dispatcher, StreamOutcome, StreamState};
use kulturarv::types::StreamEvent;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use common::{done_frame, frame, full_body, token_frame, CancelAfterTokens, Recorder};

fn chunks_of(parts: &[&[u8]]) -> impl futures::Stream<Item = Result<Bytes, std::io::Error>> {
    let owned: Vec<Result<Bytes, std::io::Error>> = parts
        .iter()
        .map(|p| Ok(Bytes::copy_from_slice(p)))
        .collect();
    futures::stream::iter(owned)
}

/// Feed `parts` through a synchronous dispatcher.
fn run_sync(parts: &[&[u8]]) -> (Vec<StreamEvent>, StreamOutcome) {
    let mut recorder = Recorder::default();
    let outcome = {
        let mut dispatcher = Dispatcher::new(&mut recorder);
        for part in parts {
            if !dispatcher.feed(part) {
                break;
            }
        }
        dispatcher.finish()
    };
    (recorder.events, outcome)
}

#[test]
fn every_two_way_split_matches_unchunked_read() {
    let body = full_body();
    let bytes = body.as_bytes();
    let (expected, expected_outcome) = run_sync(&[bytes]);

    assert_eq!(
        expected.iter().map(StreamEvent::kind).collect::<Vec<_>>(),
        vec!["status", "tool_start", "tool_end", "token", "token", "token", "done"]
    );
    assert_eq!(expected_outcome, StreamOutcome::Completed);

    for split in 0..=bytes.len() {
        let (events, outcome) = run_sync(&[&bytes[..split], &bytes[split..]]);
        assert_eq!(events, expected, "split at byte {split}");
        assert_eq!(outcome, StreamOutcome::Completed);
    }
}

#[test]
fn byte_at_a_time_matches_unchunked_read() {
    let body = full_body();
    let bytes = body.as_bytes();
    let (expected, _) = run_sync(&[bytes]);

    let singles: Vec<&[u8]> = bytes.chunks(1).collect();
    let (events, outcome) = run_sync(&singles);
    assert_eq!(events, expected);
    assert_eq!(outcome, StreamOutcome::Completed);
}

#[test]
fn three_way_splits_match_unchunked_read() {
    let body = full_body();
    let bytes = body.as_bytes();
    let (expected, _) = run_sync(&[bytes]);

    for first in (0..bytes.len()).step_by(7) {
        for second in (first..bytes.len()).step_by(11) {
            let parts = [&bytes[..first], &bytes[first..second], &bytes[second..]];
            let (events, _) = run_sync(&parts);
            assert_eq!(events, expected, "splits at {first} and {second}");
        }
    }
}

#[test]
fn blank_and_empty_data_lines_dispatch_nothing() {
    let (events, outcome) = run_sync(&[b"\n\n   \n\t\r\ndata:\ndata:   \nevent: token\n"]);
    assert!(events.is_empty());
    assert_eq!(outcome, StreamOutcome::Ended);
}

#[test]
fn malformed_frame_does_not_block_later_frames() {
    let body = format!(
        "data: {{\"type\":\"token\",\"content\":\n\n{}data: {{\"type\":\"mystery\"}}\n\n{}",
        token_frame("etter"),
        token_frame("feil")
    );
    let mut recorder = Recorder::default();
    let dropped = {
        let mut dispatcher = Dispatcher::new(&mut recorder);
        dispatcher.feed(body.as_bytes());
        dispatcher.finish();
        dispatcher.dropped_frames()
    };
    assert_eq!(recorder.tokens(), vec!["etter", "feil"]);
    assert_eq!(dropped, 2);
}

#[test]
fn nothing_is_dispatched_after_done() {
    let body = format!("{}{}{}", token_frame("før"), done_frame(), token_frame("etter"));
    let (events, outcome) = run_sync(&[body.as_bytes()]);

    assert_eq!(
        events.iter().map(StreamEvent::kind).collect::<Vec<_>>(),
        vec!["token", "done"]
    );
    assert_eq!(outcome, StreamOutcome::Completed);
}

#[test]
fn error_frame_terminates_with_message() {
    let body = format!(
        "{}{}{}",
        token_frame("delvis"),
        frame(r#"{"type":"error","message":"Verktøyet svarte ikke"}"#),
        token_frame("aldri")
    );
    let (events, outcome) = run_sync(&[body.as_bytes()]);

    assert_eq!(events.len(), 2);
    assert_eq!(
        outcome,
        StreamOutcome::Errored("Verktøyet svarte ikke".to_string())
    );
}

#[test]
fn unterminated_final_frame_is_flushed() {
    let body = format!("{}data: {{\"type\":\"token\",\"content\":\"slutt\"}}", token_frame("a"));
    let (events, outcome) = run_sync(&[body.as_bytes()]);
    assert_eq!(
        events,
        vec![
            StreamEvent::Token {
                content: "a".into()
            },
            StreamEvent::Token {
                content: "slutt".into()
            },
        ]
    );
    assert_eq!(outcome, StreamOutcome::Ended);
}

#[test]
fn dispatcher_walks_the_state_table() {
    let mut recorder = Recorder::default();
    let mut dispatcher = Dispatcher::new(&mut recorder);
    assert_eq!(dispatcher.state(), StreamState::Idle);

    dispatcher.connect();
    assert_eq!(dispatcher.state(), StreamState::Connecting);

    dispatcher.feed(token_frame("x").as_bytes());
    assert_eq!(dispatcher.state(), StreamState::Streaming);

    dispatcher.feed(done_frame().as_bytes());
    assert_eq!(dispatcher.state(), StreamState::Done);
    assert!(!dispatcher.feed(token_frame("y").as_bytes()));
    assert_eq!(dispatcher.outcome(), Some(&StreamOutcome::Completed));
}

#[tokio::test]
async fn example_tokens_then_done() {
    let first = token_frame("Hei");
    let second = token_frame(" verden");
    let third = done_frame();
    let cancel = CancellationToken::new();
    let mut recorder = Recorder::default();

    let outcome = dispatch(
        chunks_of(&[first.as_bytes(), second.as_bytes(), third.as_bytes()]),
        &mut recorder,
        &cancel,
    )
    .await;

    assert_eq!(outcome, StreamOutcome::Completed);
    assert_eq!(recorder.kinds(), vec!["token", "token", "done"]);
    assert_eq!(recorder.tokens(), vec!["Hei", " verden"]);
    match &recorder.events[2] {
        StreamEvent::Done { response } => {
            assert_eq!(response.response.text, "Hei verden");
            assert_eq!(response.sources[0].provider, "snl");
            assert_eq!(response.locations[0].category, "site");
            assert_eq!(response.metadata.processing_time_ms, 842);
        }
        other => panic!("expected done, got {other:?}"),
    }
}

#[tokio::test]
async fn async_dispatch_matches_sync_dispatch() {
    let body = full_body();
    let (expected, _) = run_sync(&[body.as_bytes()]);
    let parts: Vec<&[u8]> = body.as_bytes().chunks(13).collect();

    let mut recorder = Recorder::default();
    let outcome = dispatch(chunks_of(&parts), &mut recorder, &CancellationToken::new()).await;

    assert_eq!(outcome, StreamOutcome::Completed);
    assert_eq!(recorder.events, expected);
}

#[tokio::test]
async fn cancel_before_first_chunk_dispatches_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let body = full_body();
    let mut recorder = Recorder::default();

    let outcome = dispatch(chunks_of(&[body.as_bytes()]), &mut recorder, &cancel).await;

    assert_eq!(outcome, StreamOutcome::Cancelled);
    assert!(recorder.events.is_empty());
}

#[tokio::test]
async fn cancel_after_n_tokens_stops_within_the_same_chunk() {
    let body: String = ["en", "to", "tre", "fire", "fem"]
        .iter()
        .map(|t| token_frame(t))
        .chain(std::iter::once(done_frame()))
        .collect();
    let cancel = CancellationToken::new();
    let mut handler = CancelAfterTokens {
        recorder: Recorder::default(),
        after: 2,
        cancel: cancel.clone(),
    };

    let outcome = dispatch(chunks_of(&[body.as_bytes()]), &mut handler, &cancel).await;

    assert_eq!(outcome, StreamOutcome::Cancelled);
    assert_eq!(handler.recorder.tokens(), vec!["en", "to"]);
    assert!(!handler
        .recorder
        .events
        .iter()
        .any(|e| e.is_terminal()));
}

#[tokio::test(start_paused = true)]
async fn cancel_while_waiting_for_bytes() {
    let first = token_frame("Hei");
    let stream = chunks_of(&[first.as_bytes()]).chain(futures::stream::pending());
    let cancel = CancellationToken::new();
    let _timer = kulturarv::util::cancel_after(&cancel, Duration::from_secs(5));
    let mut recorder = Recorder::default();

    let outcome = dispatch(stream, &mut recorder, &cancel).await;

    assert_eq!(outcome, StreamOutcome::Cancelled);
    assert_eq!(recorder.tokens(), vec!["Hei"]);
}

#[tokio::test]
async fn transport_fault_reports_error_once() {
    let first = token_frame("Hei");
    let items: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from(first)),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        )),
        Ok(Bytes::from(token_frame("aldri"))),
    ];
    let mut recorder = Recorder::default();

    let outcome = dispatch(
        futures::stream::iter(items),
        &mut recorder,
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(outcome, StreamOutcome::Errored("connection reset".into()));
    assert_eq!(recorder.kinds(), vec!["token", "error"]);
    assert_eq!(
        recorder.events[1],
        StreamEvent::Error {
            message: "connection reset".into()
        }
    );
}

#[tokio::test]
async fn transport_fault_closes_a_conversation_reply() {
    use kulturarv::conversation::Conversation;
    use kulturarv::types::Source;

    let mut conversation = Conversation::new();
    conversation.begin_turn("Hei", &Source::all()).unwrap();
    let items: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from(token_frame("Del"))),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        )),
    ];

    let outcome = dispatch(
        futures::stream::iter(items),
        &mut conversation,
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(outcome, StreamOutcome::Errored("connection reset".into()));
    assert!(!conversation.is_busy());
    assert_eq!(
        conversation.messages()[1].error.as_deref(),
        Some("connection reset")
    );
    assert!(conversation.begin_turn("Igjen", &Source::all()).is_ok());
}

#[tokio::test]
async fn body_without_terminal_frame_calls_on_end_once() {
    use kulturarv::stream::StreamCallbacks;
    use std::cell::Cell;

    let ends = Cell::new(0);
    let errors = Cell::new(0);
    let mut callbacks = StreamCallbacks::new()
        .end(|| ends.set(ends.get() + 1))
        .error(|_| errors.set(errors.get() + 1));
    let body = token_frame("Hei");

    let outcome = dispatch(
        chunks_of(&[body.as_bytes()]),
        &mut callbacks,
        &CancellationToken::new(),
    )
    .await;
    drop(callbacks);

    assert_eq!(outcome, StreamOutcome::Ended);
    assert_eq!(ends.get(), 1);
    assert_eq!(errors.get(), 0);
}

#[tokio::test]
async fn transport_fault_invokes_on_error() {
    use kulturarv::stream::StreamCallbacks;
    use std::cell::RefCell;

    let errors = RefCell::new(Vec::new());
    let mut callbacks = StreamCallbacks::new().error(|m| errors.borrow_mut().push(m.to_string()));
    let items: Vec<Result<Bytes, std::io::Error>> =
        vec![Err(std::io::Error::other("peer went away"))];

    dispatch(
        futures::stream::iter(items),
        &mut callbacks,
        &CancellationToken::new(),
    )
    .await;
    drop(callbacks);

    assert_eq!(errors.into_inner(), vec!["peer went away".to_string()]);
}

#[tokio::test]
async fn decode_events_yields_until_done() {
    let body = format!("{}{}{}", token_frame("a"), done_frame(), token_frame("b"));
    let events: Vec<_> = decode_events(chunks_of(&[body.as_bytes()])).collect().await;

    let kinds: Vec<_> = events
        .iter()
        .map(|e| e.as_ref().unwrap().kind())
        .collect();
    assert_eq!(kinds, vec!["token", "done"]);
}

#[tokio::test]
async fn decode_events_surfaces_transport_fault() {
    let items: Vec<Result<Vec<u8>, std::io::Error>> = vec![
        Ok(token_frame("a").into_bytes()),
        Err(std::io::Error::other("boom")),
    ];
    let events: Vec<_> = decode_events(futures::stream::iter(items)).collect().await;

    assert_eq!(events.len(), 2);
    assert!(events[0].is_ok());
    assert!(matches!(events[1], Err(kulturarv::error::KulturarvError::Io(_))));
}

#[tokio::test]
async fn collect_response_needs_a_done_event() {
    use kulturarv::error::KulturarvError;
    use kulturarv::stream::collect_response;

    let complete = format!("{}{}", token_frame("Hei"), done_frame());
    let response = collect_response(decode_events(chunks_of(&[complete.as_bytes()])))
        .await
        .unwrap();
    assert_eq!(response.response.text, "Hei verden");

    let truncated = token_frame("Hei");
    let err = collect_response(decode_events(chunks_of(&[truncated.as_bytes()])))
        .await
        .unwrap_err();
    assert!(matches!(err, KulturarvError::Stream(_)));
}
