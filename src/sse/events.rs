//! SSE event types and definitions
//!
//! Contains the `SseEvent` produced for each frame block and the `SseLine`
//! classification of individual field lines.

use serde::{Deserialize, Serialize};

/// One Server-Sent Event, built from a single blank-line-delimited block.
///
/// Every field is optional. A block that carries none of them produces no
/// event at all, so an `SseEvent` always has at least one field set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SseEvent {
    /// Event type name (`event:` line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Payload; multiple `data:` lines are joined with `\n`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Last event id (`id:` line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Reconnection delay in milliseconds (`retry:` line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<u64>,
}

impl SseEvent {
    /// Create an event carrying only a data payload.
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Set the event type name.
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the event id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the reconnection delay.
    pub fn with_retry(mut self, retry: u64) -> Self {
        self.retry = Some(retry);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.event.is_none() && self.data.is_none() && self.id.is_none() && self.retry.is_none()
    }

    /// The data payload, if present and non-empty.
    pub fn non_empty_data(&self) -> Option<&str> {
        self.data.as_deref().filter(|d| !d.is_empty())
    }
}

/// A single classified line of an SSE block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// `event:` line, value trimmed
    Event(String),
    /// `data:` line, with at most one leading space removed
    Data(String),
    /// `id:` line, value trimmed
    Id(String),
    /// `retry:` line; `None` when the value is not an integer
    Retry(Option<u64>),
    /// Comment line (starts with `:`)
    Comment(String),
    /// Unrecognized field, kept verbatim
    Unknown(String),
    /// Empty line
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_event_is_empty() {
        assert!(SseEvent::default().is_empty());
        assert!(!SseEvent::data("x").is_empty());
        assert!(!SseEvent::default().with_retry(10).is_empty());
    }

    #[test]
    fn test_non_empty_data() {
        assert_eq!(SseEvent::data("hi").non_empty_data(), Some("hi"));
        assert_eq!(SseEvent::data("").non_empty_data(), None);
        assert_eq!(SseEvent::default().with_event("ping").non_empty_data(), None);
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let event = SseEvent::data("hello").with_event("message");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"message","data":"hello"}"#);
    }

    #[test]
    fn test_deserialize_roundtrip() {
        let event = SseEvent::data("a\nb").with_id("7").with_retry(3000);
        let json = serde_json::to_string(&event).unwrap();
        let parsed: SseEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
