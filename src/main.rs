//! Interactive terminal front end.
//!
//! The main task reads typed commands and renders [`UiEvent`]s; all command
//! handling happens on one background worker task at a time. While a worker
//! is active only `stop` and `quit` are accepted, so the interface stays
//! responsive without any queueing.
//!
//! Tracing goes to stderr so stdout stays clean for the conversation.

use anyhow::Context;
use elisa::services::ServiceHub;
use elisa::tts::{SilentTts, SystemTts, Synthesizer};
use elisa::{Session, Settings, UiEvent};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings_path = Settings::default_settings_path();
    let settings = Settings::load_or_init(&settings_path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load settings; using defaults");
        Settings::default()
    });

    let voice: Arc<dyn Synthesizer> = match SystemTts::new(&settings) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::warn!(error = %e, "speech output unavailable");
            Arc::new(SilentTts::new(e.to_string()))
        }
    };

    match voice.voices() {
        Ok(voices) if voices.is_empty() => {
            tracing::warn!("no text-to-speech voices found; the assistant may not be able to speak");
        }
        Ok(voices) => {
            tracing::info!(count = voices.len(), voice_id = settings.voice_id, "speech engine ready");
        }
        Err(e) => tracing::warn!(error = %e, "could not enumerate voices"),
    }

    let services = ServiceHub::production().context("failed to set up services")?;
    let transcriber = match elisa::stt::build_transcriber() {
        Ok(transcriber) => transcriber,
        Err(e) => {
            tracing::warn!(error = %e, "speech input unavailable");
            None
        }
    };

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let session = Session::new(
        settings,
        settings_path,
        Arc::clone(&voice),
        services,
        transcriber,
        events_tx,
    );
    let stop = session.stop_flag();
    let session = Arc::new(tokio::sync::Mutex::new(session));

    println!("Hello! I'm Elisa, your personal assistant. Speak to me or type a command.");
    println!("Type 'listen' to use the microphone, 'help' for commands, 'quit' to exit.");
    if !elisa::stt::microphone_available() {
        println!("(No microphone detected; voice commands are unavailable.)");
    }

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut worker: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            Some(event) = events.recv() => print_event(&event),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let input = line.trim().to_owned();
                if input.is_empty() {
                    continue;
                }

                if worker.as_ref().is_some_and(JoinHandle::is_finished) {
                    worker = None;
                }

                let lower = input.to_lowercase();
                match lower.as_str() {
                    "quit" | "exit" => break,
                    "stop" => {
                        stop.request();
                        if let Err(e) = voice.stop() {
                            tracing::debug!(error = %e, "could not stop speech engine");
                        }
                        println!("All processes stopped.");
                        continue;
                    }
                    _ => {}
                }

                if worker.is_some() {
                    println!("Still working on the previous request. Type 'stop' to cancel it first.");
                    continue;
                }

                // Instant commands run inline on an idle session.
                if run_inline_command(&session, &lower).await {
                    continue;
                }

                // Everything else goes to the single worker slot. The stop
                // flag resets here, once the previous command is done.
                stop.reset();
                let task = if lower == "listen" || lower == "speak" {
                    None
                } else {
                    Some(input)
                };
                let session = Arc::clone(&session);
                worker = Some(tokio::spawn(async move {
                    let mut session = session.lock().await;
                    match task {
                        None => session.listen_once().await,
                        Some(text) => session.handle_utterance(&text, false).await,
                    }
                }));
            }
        }
    }

    Ok(())
}

/// Handle the quick commands that never need the worker slot. Returns true
/// when the input was consumed.
async fn run_inline_command(
    session: &Arc<tokio::sync::Mutex<Session>>,
    lower: &str,
) -> bool {
    let mut session = session.lock().await;
    if lower == "history" {
        if session.history().is_empty() {
            println!("No conversation yet.");
        } else {
            for entry in session.history().entries() {
                println!("{} - {}: {}", entry.time, entry.speaker, entry.text);
            }
        }
        return true;
    }
    if lower == "clear history" {
        session.clear_history();
        return true;
    }
    if lower == "save settings" {
        session.save_settings();
        return true;
    }
    if let Some(rest) = lower.strip_prefix("set voice ") {
        match rest.trim().parse::<usize>() {
            Ok(index) => session.set_voice(index),
            Err(_) => println!("Usage: set voice <number>"),
        }
        return true;
    }
    if let Some(rest) = lower.strip_prefix("set rate ") {
        match rest.trim().parse::<u32>() {
            Ok(rate) => session.set_rate(rate),
            Err(_) => println!("Usage: set rate <words per minute>"),
        }
        return true;
    }
    if let Some(rest) = lower.strip_prefix("set volume ") {
        match rest.trim().parse::<f32>() {
            Ok(volume) => session.set_volume(volume),
            Err(_) => println!("Usage: set volume <0.1-1.0>"),
        }
        return true;
    }
    false
}

fn print_event(event: &UiEvent) {
    match event {
        UiEvent::Status(text) => println!("... {text}"),
        UiEvent::Heard(text) => println!("You said: {text}"),
        UiEvent::Reply(text) => println!("Elisa: {text}"),
    }
}
