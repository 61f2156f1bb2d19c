//! Error category classification for stream failures.
//!
//! Categories drive the controller's retry decision and give callers a
//! stable way to branch on what went wrong.

use std::fmt;

/// High-level categorization of stream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The response could not yield a readable byte stream.
    /// Fatal, never retried.
    Capability,

    /// The request failed before any data arrived.
    /// Retried up to the configured limit.
    Establishment,

    /// Reading an already-open stream failed.
    /// Never retried: delivered data cannot be replayed safely.
    Read,

    /// The session was cancelled.
    Cancellation,
}

impl ErrorCategory {
    /// Returns true if the controller retries failures in this category.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Establishment)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Capability => "capability",
            ErrorCategory::Establishment => "establishment",
            ErrorCategory::Read => "read",
            ErrorCategory::Cancellation => "cancellation",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Capability => "Streaming is not available for this response",
            ErrorCategory::Establishment => "Could not open the stream",
            ErrorCategory::Read => "The stream broke while reading",
            ErrorCategory::Cancellation => "The stream was cancelled",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
