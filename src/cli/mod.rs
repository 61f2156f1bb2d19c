//! CLI module for streamtap.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Version and usage display
//! - Streaming a URL to stdout
//!
//! # Usage
//!
//! ```ignore
//! use streamtap::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args())?;
//! let code = run_cli_command(command).await?;
//! std::process::exit(code);
//! ```

pub mod args;

pub use args::{parse_args, ArgsError, CliCommand, CliOptions, USAGE};

use std::io::Write;

use color_eyre::Result;

use crate::client::StreamClient;
use crate::config::{ClientConfig, RequestConfig, StreamOptions};
use crate::error::StreamError;
use crate::sse::SseEvent;
use crate::stream::{SessionState, StreamHandle};
use crate::traits::HttpClient;

/// Current version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code for a session cancelled with Ctrl-C.
pub const EXIT_CANCELLED: i32 = 130;

/// Run a parsed command and return the process exit code.
pub async fn run_cli_command(command: CliCommand) -> Result<i32> {
    match command {
        CliCommand::Version => {
            println!("streamtap {}", VERSION);
            Ok(0)
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(0)
        }
        CliCommand::Stream(options) => {
            let config = ClientConfig::from_env().with_user_agent(format!("streamtap/{}", VERSION));
            let state = run_stream(&StreamClient::new(config), &options).await?;
            Ok(exit_code(state))
        }
    }
}

/// Stream `options.url` to stdout until it ends, fails, or Ctrl-C cancels it.
pub async fn run_stream<C>(client: &StreamClient<C>, options: &CliOptions) -> Result<SessionState>
where
    C: HttpClient + ?Sized + 'static,
{
    let stream_options = build_stream_options(options);
    let handle = if options.raw {
        client.stream(stream_options, write_chunk, flush_stdout, report_error)
    } else {
        client.stream_sse(stream_options, write_event, flush_stdout, report_error)
    };

    Ok(wait_or_interrupt(handle).await)
}

/// Translate CLI options into controller options.
pub fn build_stream_options(options: &CliOptions) -> StreamOptions {
    let mut request = RequestConfig::new(options.url.as_str())
        .with_method(options.method)
        .with_header("Accept", if options.raw { "*/*" } else { "text/event-stream" });
    for (name, value) in &options.headers {
        request = request.with_header(name.as_str(), value.as_str());
    }
    if let Some(data) = &options.data {
        request = request.with_body(data.as_str());
    }

    StreamOptions::new(request)
        .with_retry(options.retry)
        .with_retry_delay(options.retry_delay)
}

/// Map a terminal session state to a process exit code.
pub fn exit_code(state: SessionState) -> i32 {
    match state {
        SessionState::Completed => 0,
        SessionState::Cancelled => EXIT_CANCELLED,
        _ => 1,
    }
}

/// One JSON line per event.
pub fn format_event(event: &SseEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

async fn wait_or_interrupt(handle: StreamHandle) -> SessionState {
    let cancel = handle.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling stream");
            cancel.cancel();
        }
    });

    let state = handle.wait().await;
    interrupt.abort();
    state
}

fn write_chunk(chunk: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(chunk.as_bytes()).and_then(|_| stdout.flush()) {
        tracing::warn!("failed to write chunk: {}", e);
    }
}

fn write_event(event: SseEvent) {
    match format_event(&event) {
        Ok(line) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
                tracing::warn!("failed to write event: {}", e);
            }
        }
        Err(e) => tracing::warn!("failed to encode event: {}", e),
    }
}

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

fn report_error(err: StreamError) {
    eprintln!("streamtap: {}", err.user_message());
}
