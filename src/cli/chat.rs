//! `kulturarv chat`: one question, answer streamed to the terminal.

use std::io::Write;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::ChatClient;
use crate::config::Language;
use crate::conversation::{Conversation, Message};
use crate::stream::{StreamHandler, StreamOutcome};
use crate::types::{tool_display_name, Source, StreamEvent};
use crate::util::cancel_after;

use super::preferences::load_preferences;
use super::ChatArgs;

/// Prints events as they arrive and records them in the conversation.
struct TerminalHandler {
    conversation: Conversation,
}

impl StreamHandler for TerminalHandler {
    fn on_event(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::Status { message } => eprintln!("… {message}"),
            StreamEvent::ToolStart { tool, .. } => eprintln!("⚡ {}", tool_display_name(tool)),
            StreamEvent::ToolEnd { tool, success, .. } => {
                let mark = if *success { "✅" } else { "❌" };
                eprintln!("  {mark} {}", tool_display_name(tool));
            }
            StreamEvent::Token { content } => {
                print!("{content}");
                let _ = std::io::stdout().flush();
            }
            StreamEvent::Error { message } => eprintln!("\n❌ {message}"),
            StreamEvent::Done { .. } => {}
        }
        self.conversation.apply(event);
    }

    fn on_end(&mut self) {
        self.conversation.end_turn();
    }
}

pub async fn handle_chat(
    client: &ChatClient,
    args: ChatArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = load_preferences()?;
    let language = prefs.language();
    let token = args
        .token
        .or_else(|| prefs.access_token().map(str::to_owned))
        .ok_or("no access token; run `kulturarv login <token>` first")?;

    let sources = if args.sources.is_empty() {
        Source::all()
    } else {
        args.sources
    };

    let mut conversation = Conversation::new();
    let request = conversation.begin_turn(&args.prompt, &sources)?;

    if args.no_stream {
        let response = client.send_message(&token, &request).await?;
        print_reply(&Message::from_response(&response), language, true);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let deadline = args
        .timeout
        .map(|secs| cancel_after(&cancel, Duration::from_secs(secs)));

    let mut handler = TerminalHandler { conversation };
    let result = client
        .stream_message(&token, &request, &mut handler, &cancel)
        .await;

    ctrl_c.abort();
    if let Some(deadline) = deadline {
        deadline.abort();
    }

    let outcome = result?;
    println!();
    if outcome == StreamOutcome::Cancelled {
        handler.conversation.cancel_turn();
    }
    if let Some(reply) = handler.conversation.messages().last() {
        print_reply(reply, language, false);
    }
    if let StreamOutcome::Errored(_) = outcome {
        // The message itself was already printed as it arrived.
        return Err(match language {
            Language::No => "svaret ble avbrutt av en feil",
            Language::En => "the reply ended with an error",
        }
        .into());
    }
    Ok(())
}

fn print_reply(reply: &Message, language: Language, include_text: bool) {
    if include_text {
        println!("{}", reply.content);
    }

    let (sources_label, related_label) = match language {
        Language::No => ("Kilder", "Relaterte spørsmål"),
        Language::En => ("Sources", "Related questions"),
    };

    if !reply.sources.is_empty() {
        println!("\n{sources_label}:");
        for source in &reply.sources {
            println!("  [{}] {} — {}", source.provider, source.title, source.url);
        }
    }
    if !reply.related_queries.is_empty() {
        println!("\n{related_label}:");
        for query in &reply.related_queries {
            println!("  • {query}");
        }
    }
}
