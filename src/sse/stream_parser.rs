//! Stateful SSE stream parsing
//!
//! Tolerates frame blocks split across arbitrary chunk boundaries by keeping
//! the tail of the buffer until a later chunk closes it.

use crate::sse::events::SseEvent;
use crate::sse::frame::{parse_sse_block, split_blocks};

/// Stateful SSE parser that accumulates chunks and emits complete events.
///
/// The last segment after a split is never parsed in the same call, so a
/// block is only emitted once its terminating blank line has arrived. If the
/// producer stops without a final blank line, that block is never emitted.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    /// Tail fragment carried over to the next chunk
    buffer: String,
}

impl SseStreamParser {
    /// Create a new parser with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event completed by it, in order.
    pub fn feed(&mut self, chunk: &str) -> Vec<SseEvent> {
        let mut events = Vec::new();
        self.feed_with(chunk, |event| events.push(event));
        events
    }

    /// Feed a chunk, passing each completed event to `on_event`.
    pub fn feed_with<F>(&mut self, chunk: &str, mut on_event: F)
    where
        F: FnMut(SseEvent),
    {
        self.buffer.push_str(chunk);

        let (blocks, rest) = split_blocks(&self.buffer);
        if blocks.is_empty() {
            return;
        }

        for block in blocks {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }
            if let Some(event) = parse_sse_block(block) {
                on_event(event);
            }
        }

        self.buffer = rest.to_string();
    }

    /// The fragment currently held back waiting for a delimiter
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Discard any buffered fragment
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Build a chunk consumer that parses SSE and passes whole events to
/// `on_event`.
///
/// The returned closure owns its own [`SseStreamParser`]; use one per stream.
///
/// # Example
///
/// ```
/// use streamtap::sse::sse_stream_parser;
///
/// let mut seen = Vec::new();
/// {
///     let mut feed = sse_stream_parser(|event| seen.push(event));
///     feed("event: greeting\ndata: hel");
///     feed("lo\n\n");
/// }
/// assert_eq!(seen[0].data.as_deref(), Some("hello"));
/// assert_eq!(seen[0].event.as_deref(), Some("greeting"));
/// ```
pub fn sse_stream_parser<F>(mut on_event: F) -> impl FnMut(&str)
where
    F: FnMut(SseEvent),
{
    let mut parser = SseStreamParser::new();
    move |chunk: &str| parser.feed_with(chunk, &mut on_event)
}
