//! SSE (Server-Sent Events) parsing
//!
//! SSE format consists of blocks separated by a blank line. Each block holds
//! field lines:
//! - `event: <type>` - event type
//! - `data: <payload>` - payload line (repeatable, joined with `\n`)
//! - `id: <id>` - last event id
//! - `retry: <ms>` - reconnection delay
//! - Lines starting with `:` - comments (ignored)
//!
//! Unknown fields and malformed `retry:` values are ignored, never rejected.
//!
//! # Module structure
//! - `events` - `SseEvent` and `SseLine`
//! - `frame` - Pure block splitting and block parsing
//! - `split` - Stateless chunk splitter surfacing data payloads
//! - `stream_parser` - Stateful parser tolerant of split frames

mod events;
mod frame;
mod split;
mod stream_parser;

// Re-export public types
pub use events::{SseEvent, SseLine};
pub use frame::{parse_sse_block, parse_sse_line, split_blocks};
pub use split::split_sse_data;
pub use stream_parser::{sse_stream_parser, SseStreamParser};
