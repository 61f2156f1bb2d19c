//! Common test utilities for integration tests.
//!
//! `Recorder` captures every callback a streaming session makes so tests can
//! assert on ordering and on the exactly-once terminal callback.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use streamtap::config::StreamOptions;
use streamtap::error::StreamError;
use streamtap::sse::SseEvent;
use streamtap::stream::{stream, StreamHandle};
use streamtap::traits::HttpClient;
use streamtap::StreamClient;

/// Everything a session reported.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub chunks: Vec<String>,
    pub events: Vec<SseEvent>,
    pub completed: usize,
    pub errors: Vec<StreamError>,
}

impl Recorded {
    /// Number of terminal callbacks observed.
    pub fn terminal_count(&self) -> usize {
        self.completed + self.errors.len()
    }

    pub fn joined(&self) -> String {
        self.chunks.concat()
    }
}

/// Shared callback sink.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Recorded>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a raw session on `client` with callbacks feeding this recorder.
    pub fn start<C>(&self, client: Arc<C>, options: StreamOptions) -> StreamHandle
    where
        C: HttpClient + ?Sized + 'static,
    {
        let (a, b, c) = (self.clone(), self.clone(), self.clone());
        stream(
            client,
            options,
            move |chunk| a.lock().chunks.push(chunk.to_string()),
            move || b.lock().completed += 1,
            move |err| c.lock().errors.push(err),
        )
    }

    /// Start an SSE session through a `StreamClient`.
    pub fn start_sse<C>(&self, client: &StreamClient<C>, options: StreamOptions) -> StreamHandle
    where
        C: HttpClient + ?Sized + 'static,
    {
        let (a, b, c) = (self.clone(), self.clone(), self.clone());
        client.stream_sse(
            options,
            move |event| a.lock().events.push(event),
            move || b.lock().completed += 1,
            move |err| c.lock().errors.push(err),
        )
    }

    pub fn snapshot(&self) -> Recorded {
        self.lock().clone()
    }

    /// Yield until at least `n` chunks have been delivered.
    pub async fn wait_for_chunks(&self, n: usize) {
        while self.lock().chunks.len() < n {
            tokio::task::yield_now().await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.0.lock().unwrap()
    }
}
