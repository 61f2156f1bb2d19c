//! streamtap - cancellable, retryable HTTP response streaming with an
//! incremental Server-Sent-Events parser.
//!
//! The HTTP transport sits behind [`traits::HttpClient`]; [`stream::stream`]
//! drives one session over it, and [`client::StreamClient`] bundles a client
//! with its defaults.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod sse;
pub mod stream;
pub mod traits;

pub use client::{ChunkStream, StreamClient};
pub use config::{ClientConfig, RequestConfig, StreamOptions};
pub use error::StreamError;
pub use sse::{parse_sse_block, split_sse_data, sse_stream_parser, SseEvent, SseStreamParser};
pub use stream::{stream, CancelHandle, SessionState, StreamHandle};
