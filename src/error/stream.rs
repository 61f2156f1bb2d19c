//! Stream session error types.
//!
//! Every failure of a streaming session is resolved into one of these and
//! handed to the session's error callback; nothing is thrown across the
//! streaming entry point.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Message carried by [`StreamError::Cancelled`].
pub const CANCELLED_MESSAGE: &str = "cancelled manually";

/// Message carried by [`StreamError::Unsupported`].
pub const UNSUPPORTED_MESSAGE: &str =
    "stream not supported by this environment or response was not actually streamed";

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The response exposed no readable byte stream
    #[error("{}", UNSUPPORTED_MESSAGE)]
    Unsupported,

    /// The request never produced a usable stream
    #[error("stream request failed after {attempts} attempt(s): {source}")]
    Establish {
        attempts: u32,
        #[source]
        source: HttpError,
    },

    /// Reading an open stream failed
    #[error("stream read failed: {0}")]
    Read(#[source] HttpError),

    /// The caller cancelled the session through its cancel handle
    #[error("{}", CANCELLED_MESSAGE)]
    Cancelled,
}

impl StreamError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Unsupported => ErrorCategory::Capability,
            StreamError::Establish { .. } => ErrorCategory::Establishment,
            StreamError::Read(_) => ErrorCategory::Read,
            StreamError::Cancelled => ErrorCategory::Cancellation,
        }
    }

    /// True for the manual-cancellation sentinel.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }

    /// The underlying transport error, if any.
    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            StreamError::Establish { source, .. } => Some(source),
            StreamError::Read(source) => Some(source),
            StreamError::Unsupported | StreamError::Cancelled => None,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Unsupported => {
                "The server response could not be read as a stream.".to_string()
            }
            StreamError::Establish { source, .. } => match source {
                HttpError::ServerError { status, .. } => {
                    format!("The server refused the stream (HTTP {}).", status)
                }
                _ => format!("Could not connect to the stream: {}", source),
            },
            StreamError::Read(_) => {
                "The connection was lost while streaming. Data received so far was kept.".to_string()
            }
            StreamError::Cancelled => "Stream cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Unsupported => "E_STREAM_UNSUPPORTED",
            StreamError::Establish { .. } => "E_STREAM_ESTABLISH",
            StreamError::Read(_) => "E_STREAM_READ",
            StreamError::Cancelled => "E_STREAM_CANCELLED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_cancelled_sentinel() {
        let err = StreamError::Cancelled;
        assert_eq!(err.to_string(), "cancelled manually");
        assert!(err.is_cancelled());
        assert_eq!(err.category(), ErrorCategory::Cancellation);
        assert_eq!(err.error_code(), "E_STREAM_CANCELLED");
    }

    #[test]
    fn test_unsupported_message() {
        let err = StreamError::Unsupported;
        assert!(err.to_string().starts_with("stream not supported"));
        assert!(!err.category().is_retryable());
        assert!(err.http_error().is_none());
    }

    #[test]
    fn test_establish_error() {
        let err = StreamError::Establish {
            attempts: 3,
            source: HttpError::ServerError {
                status: 503,
                message: "busy".to_string(),
            },
        };
        assert!(err.to_string().contains("after 3 attempt(s)"));
        assert!(err.to_string().contains("503"));
        assert!(err.user_message().contains("HTTP 503"));
        assert!(err.source().is_some());
        assert_eq!(err.category(), ErrorCategory::Establishment);
    }

    #[test]
    fn test_read_error() {
        let err = StreamError::Read(HttpError::Io("connection reset".to_string()));
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(err.category(), ErrorCategory::Read);
        assert_eq!(
            err.http_error(),
            Some(&HttpError::Io("connection reset".to_string()))
        );
        assert!(!err.is_cancelled());
    }
}
