//! Stateless SSE chunk splitting
//!
//! For transports that deliver whole frame blocks per chunk. Nothing is
//! carried between calls: a partial trailing block is lost.

use crate::sse::frame::{parse_sse_block, split_blocks};

/// Split a complete chunk into frame blocks and hand each non-empty `data`
/// payload to `on_data`, in source order.
///
/// Events without a data payload (pure `event:`/`id:`/`retry:` blocks) are
/// dropped; use [`crate::sse::SseStreamParser`] to observe full events.
pub fn split_sse_data<F>(chunk: &str, mut on_data: F)
where
    F: FnMut(&str),
{
    let (blocks, rest) = split_blocks(chunk);

    for block in blocks.into_iter().chain(std::iter::once(rest)) {
        if block.trim().is_empty() {
            continue;
        }
        if let Some(event) = parse_sse_block(block) {
            if let Some(data) = event.non_empty_data() {
                on_data(data);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(chunk: &str) -> Vec<String> {
        let mut out = Vec::new();
        split_sse_data(chunk, |d| out.push(d.to_string()));
        out
    }

    #[test]
    fn test_two_events_in_order() {
        assert_eq!(collect("data: hello\n\ndata: world\n\n"), vec!["hello", "world"]);
    }

    #[test]
    fn test_multiline_data() {
        assert_eq!(collect("data: a\ndata: b\n\n"), vec!["a\nb"]);
    }

    #[test]
    fn test_events_without_data_are_dropped() {
        assert_eq!(
            collect("event: ping\n\nid: 3\n\ndata: kept\n\ndata:\n\n"),
            vec!["kept"]
        );
    }

    #[test]
    fn test_comments_and_empty_segments_ignored() {
        assert_eq!(collect(": hi\n\n\n\n\ndata: x\n\n"), vec!["x"]);
        assert!(collect("").is_empty());
        assert!(collect("\n\n\n\n").is_empty());
    }

    #[test]
    fn test_trailing_block_without_delimiter_is_still_parsed() {
        // The whole chunk is assumed complete
        assert_eq!(collect("data: a\n\ndata: b"), vec!["a", "b"]);
    }

    #[test]
    fn test_nothing_is_carried_between_calls() {
        assert!(collect("event: x\n").is_empty());
        assert_eq!(collect("data: y\n\n"), vec!["y"]);
    }
}
