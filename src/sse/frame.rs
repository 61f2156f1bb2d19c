//! Frame-level SSE parsing
//!
//! Splits text into blank-line-delimited blocks and turns a single block into
//! an [`SseEvent`]. Everything here is pure and holds no state.

use crate::sse::events::{SseEvent, SseLine};

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        // Only a single leading space is part of the delimiter
        let value = rest.strip_prefix(' ').unwrap_or(rest);
        return SseLine::Data(value.to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("id:") {
        return SseLine::Id(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("retry:") {
        return SseLine::Retry(rest.trim().parse().ok());
    }

    SseLine::Unknown(line.to_string())
}

/// Parse one frame block into an event.
///
/// Returns `None` when the block contains no recognized field. Malformed
/// `retry:` values and unknown lines are skipped without affecting the rest
/// of the block.
pub fn parse_sse_block(block: &str) -> Option<SseEvent> {
    let mut event = SseEvent::default();
    let mut data_lines: Vec<String> = Vec::new();

    for raw in block.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        match parse_sse_line(line) {
            SseLine::Data(data) => data_lines.push(data),
            SseLine::Event(name) => event.event = Some(name),
            SseLine::Id(id) => event.id = Some(id),
            SseLine::Retry(Some(ms)) => event.retry = Some(ms),
            SseLine::Retry(None)
            | SseLine::Comment(_)
            | SseLine::Unknown(_)
            | SseLine::Empty => {}
        }
    }

    if !data_lines.is_empty() {
        event.data = Some(data_lines.join("\n"));
    }

    if event.is_empty() {
        None
    } else {
        Some(event)
    }
}

/// Split text on blank lines.
///
/// Returns every block that is followed by a blank line, plus the trailing
/// remainder after the last blank line (possibly empty or incomplete). A blank
/// line is two consecutive terminators, each either `\n` or `\r\n`.
pub fn split_blocks(text: &str) -> (Vec<&str>, &str) {
    let bytes = text.as_bytes();
    let mut blocks = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\n' {
            if let Some(len) = terminator_len(&bytes[i + 1..]) {
                blocks.push(&text[start..i]);
                i += 1 + len;
                start = i;
                continue;
            }
        }
        i += 1;
    }

    (blocks, &text[start..])
}

fn terminator_len(rest: &[u8]) -> Option<usize> {
    match rest {
        [b'\n', ..] => Some(1),
        [b'\r', b'\n', ..] => Some(2),
        _ => None,
    }
}
