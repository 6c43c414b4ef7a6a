//! Colloquy console
//!
//! Reads `participant: text` lines from stdin and routes them through the
//! session registry. `/contact` starts the contact wizard for the speaker,
//! `/stop` cancels their session and `/sessions` lists live sessions. Lines
//! no session claims are echoed as ordinary chat.

mod contact;

use colloquy::{Dispatch, EngineConfig, OutgoingMessage, OutputFormat, ParticipantId, SessionRegistry};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays conversation only
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colloquy=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = EngineConfig::from_env();
    tracing::info!(cancel_token = %config.cancel_token, output = ?config.output, "Console starting");

    let (outbox, messages) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_messages(messages, config.output));

    let (saved_tx, mut saved_rx) = mpsc::unbounded_channel::<contact::Contact>();
    let filing = tokio::spawn(async move {
        while let Some(contact) = saved_rx.recv().await {
            match serde_json::to_string(&contact) {
                Ok(json) => println!("saved contact {json}"),
                Err(e) => tracing::error!(error = %e, "Failed to serialize contact"),
            }
        }
    });

    let registry = SessionRegistry::new(outbox);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let Some((who, text)) = line.split_once(':') else {
            if !line.trim().is_empty() {
                tracing::warn!(line = %line, "Expected 'participant: text'");
            }
            continue;
        };
        let participant = ParticipantId::from(who.trim());
        let text = text.trim();

        match text {
            "/contact" => {
                let saved = saved_tx.clone();
                let session = contact::wizard(participant.clone(), &config, move |contact| {
                    if saved.send(contact).is_err() {
                        tracing::warn!("Contact filing stopped, record dropped");
                    }
                })?;
                match registry.start(session) {
                    Ok(true) => {}
                    Ok(false) => println!("[{participant}] a conversation is already in progress"),
                    Err(e) => tracing::error!(participant = %participant, error = %e, "Could not start wizard"),
                }
            }
            "/stop" => match registry.cancel(&participant) {
                Ok(true) => {}
                Ok(false) => println!("[{participant}] nothing to stop"),
                Err(e) => tracing::error!(participant = %participant, error = %e, "Cancel failed"),
            },
            "/sessions" => println!("{}", serde_json::to_string(&registry.snapshot())?),
            _ => match registry.dispatch_input(&participant, text) {
                Ok(Dispatch::Consumed) => {}
                Ok(Dispatch::Unclaimed) => println!("{participant}: {text}"),
                Err(e) => tracing::error!(participant = %participant, error = %e, "Session turn failed"),
            },
        }
    }

    tracing::info!(active = registry.active_count(), "Input closed, shutting down");
    drop(registry);
    drop(saved_tx);
    writer.await?;
    filing.await?;
    Ok(())
}

async fn write_messages(mut messages: mpsc::UnboundedReceiver<OutgoingMessage>, output: OutputFormat) {
    while let Some(message) = messages.recv().await {
        match output {
            OutputFormat::Text => {
                for line in message.text.to_plain().lines() {
                    println!("[{}] {line}", message.participant);
                }
            }
            OutputFormat::Json => match serde_json::to_string(&message) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "Failed to serialize message"),
            },
        }
    }
}
