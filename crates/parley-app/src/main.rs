//! Parley application binary - composition root.
//!
//! Ties the Parley crates together into an interactive terminal client:
//! 1. Load configuration from TOML
//! 2. Initialize file-backed history storage
//! 3. Build the HTTP query and transcription clients
//! 4. Run a line-based loop feeding the conversation controller
//!
//! Typed lines become text exchanges. `/voice <file>` submits a recorded
//! webm file through the clip assembler as a voice exchange.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use parley_capture::{ClipAssembler, RecorderEvent};
use parley_chat::{ChatController, ChatError};
use parley_client::{HttpQueryClient, HttpTranscriptionClient};
use parley_core::ParleyConfig;
use parley_persist::{FileStorage, HistoryBridge};
use parley_store::{Message, Sender};

mod cli;

use cli::CliArgs;

/// Expand ~ to the home directory in a path string.
fn expand_home(path: &str) -> PathBuf {
    if path.starts_with("~/") || path.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&path[2..])
    } else {
        PathBuf::from(path)
    }
}

fn print_message(message: &Message) {
    let label = match message.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    println!("{}> {}", label, message.content);
}

/// Print any conversation entries past `seen`, returning the new length.
fn print_new_messages(controller: &ChatController, seen: usize) -> usize {
    let snapshot = controller.snapshot();
    for message in &snapshot[seen.min(snapshot.len())..] {
        print_message(message);
    }
    snapshot.len()
}

/// Read a recorded file and run it through the clip assembler.
async fn submit_voice_file(controller: &ChatController, path: &str, max_clip_bytes: usize) {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("could not read {}: {}", path, e);
            return;
        }
    };

    let mut assembler = ClipAssembler::new(max_clip_bytes);
    let clip = match assembler
        .push(RecorderEvent::Chunk(bytes))
        .and_then(|_| assembler.push(RecorderEvent::Stop))
    {
        Ok(Some(clip)) => clip,
        Ok(None) => unreachable!("stop event always resolves the session"),
        Err(e) => {
            eprintln!("recording rejected: {}", e);
            return;
        }
    };

    if let Err(e) = controller.send_voice(&clip).await {
        report_exchange_error(e);
    }
}

fn report_exchange_error(err: ChatError) {
    match err {
        // The conversation already shows a failure notice for these.
        ChatError::Request(_) | ChatError::Transcription(_) => {
            tracing::warn!(error = %err, "Exchange failed")
        }
        ChatError::Busy => eprintln!("an exchange is still pending, try again shortly"),
        other => eprintln!("error: {}", other),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first; tracing uses its log level unless overridden.
    let config_file = args.resolve_config_path();
    let mut config = ParleyConfig::load_or_default(&config_file);
    if let Some(ref url) = args.query_url {
        config.endpoints.query_url = url.clone();
    }
    if let Some(ref dir) = args.history_dir {
        config.history.dir = dir.to_string_lossy().to_string();
    }

    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    tracing::info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // History storage.
    let history_dir = expand_home(&config.history.dir);
    let storage = Arc::new(FileStorage::new(history_dir));
    let bridge = HistoryBridge::new(storage, config.history.key.clone());

    // Remote clients.
    let timeout = Duration::from_secs(config.endpoints.request_timeout_secs);
    let query = Arc::new(HttpQueryClient::new(&config.endpoints.query_url, timeout)?);
    let transcriber = Arc::new(HttpTranscriptionClient::new(
        &config.endpoints.transcribe_url,
        timeout,
    )?);

    let controller = ChatController::new(bridge, query, transcriber);

    // Show the restored conversation, then take input.
    let mut seen = print_new_messages(&controller, 0);
    println!("(type a message, /voice <file>, /clear, or /quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        match line.as_str() {
            "/quit" | "/exit" => break,
            "/clear" => {
                if let Err(e) = controller.clear() {
                    report_exchange_error(e);
                } else {
                    println!("(history cleared)");
                }
                seen = 0;
                continue;
            }
            _ if line.starts_with("/voice") => {
                match line.strip_prefix("/voice").map(str::trim) {
                    Some(path) if !path.is_empty() => {
                        submit_voice_file(&controller, path, config.capture.max_clip_bytes).await;
                    }
                    _ => eprintln!("usage: /voice <file.webm>"),
                }
            }
            _ => {
                if let Err(e) = controller.send_text(&line).await {
                    report_exchange_error(e);
                }
            }
        }
        seen = print_new_messages(&controller, seen);
    }

    tracing::info!("Parley shutting down");
    Ok(())
}
