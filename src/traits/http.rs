//! HTTP client trait abstraction.
//!
//! The stream controller only needs one capability from an HTTP client:
//! issue a request and hand back either a buffered response or a lazy byte
//! stream. Each supported client gets one adapter implementing
//! [`HttpClient`]; the adapter is picked when the client is constructed.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use crate::config::RequestConfig;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// A lazy sequence of body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body
    pub body: Bytes,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, body: Bytes) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Create a new response with headers.
    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as a string.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Parse the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Response to a streaming request.
///
/// The body is optional: a transport that could not stream (or a response
/// that was fully buffered behind the caller's back) carries no byte stream,
/// which the stream controller reports as unsupported.
pub struct StreamingResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    body: Option<ByteStream>,
}

impl StreamingResponse {
    /// Create a response with a readable body.
    pub fn new(status: u16, headers: Headers, body: ByteStream) -> Self {
        Self {
            status,
            headers,
            body: Some(body),
        }
    }

    /// Create a response that exposes no byte stream.
    pub fn without_body(status: u16, headers: Headers) -> Self {
        Self {
            status,
            headers,
            body: None,
        }
    }

    /// Acquire the body as a lazy byte stream, if the response has one.
    pub fn into_byte_stream(self) -> Option<ByteStream> {
        self.body
    }
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// HTTP client errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server returned an error status
    ServerError { status: u16, message: String },
    /// Request was cancelled
    Cancelled,
    /// IO error while reading the body
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl HttpError {
    /// True when the failure is the result of an abort.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpError::Cancelled)
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::Cancelled => write!(f, "Request cancelled"),
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for HTTP client operations.
///
/// Implementations include the production reqwest-based client and a mock
/// client for testing.
///
/// # Example
///
/// ```ignore
/// use streamtap::config::RequestConfig;
/// use streamtap::traits::{HttpClient, HttpError};
///
/// async fn fetch<C: HttpClient>(client: &C) -> Result<String, HttpError> {
///     let response = client.send(&RequestConfig::new("https://api.example.com/data")).await?;
///     response.text().map_err(|e| HttpError::Other(e.to_string()))
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a request and buffer the whole response body.
    async fn send(&self, request: &RequestConfig) -> Result<Response, HttpError>;

    /// Issue a request and return as soon as the response head arrives.
    ///
    /// Implementations must honor `cancel` while waiting for the response,
    /// returning [`HttpError::Cancelled`], must not apply a timeout unless
    /// `request.timeout` is set, and must report a non-2xx status as
    /// [`HttpError::ServerError`].
    async fn send_streaming(
        &self,
        request: &RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<StreamingResponse, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_response_is_success() {
        assert!(Response::new(200, Bytes::new()).is_success());
        assert!(Response::new(299, Bytes::new()).is_success());
        assert!(!Response::new(300, Bytes::new()).is_success());
        assert!(!Response::new(500, Bytes::new()).is_success());
    }

    #[test]
    fn test_response_text_and_json() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Data {
            value: i32,
        }

        let response = Response::new(200, Bytes::from(r#"{"value":42}"#));
        assert_eq!(response.text().unwrap(), r#"{"value":42}"#);
        assert_eq!(response.json::<Data>().unwrap(), Data { value: 42 });
    }

    #[tokio::test]
    async fn test_streaming_response_body() {
        let body: ByteStream = Box::pin(futures::stream::iter(vec![Ok(Bytes::from("a"))]));
        let response = StreamingResponse::new(200, Headers::new(), body);
        let mut stream = response.into_byte_stream().unwrap();
        assert_eq!(stream.next().await, Some(Ok(Bytes::from("a"))));
        assert_eq!(stream.next().await, None);
    }

    #[test]
    fn test_streaming_response_without_body() {
        let response = StreamingResponse::without_body(200, Headers::new());
        assert!(format!("{:?}", response).contains("has_body: false"));
        assert!(response.into_byte_stream().is_none());
    }

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            HttpError::ServerError {
                status: 503,
                message: "busy".to_string()
            }
            .to_string(),
            "Server error (503): busy"
        );
        assert_eq!(HttpError::Cancelled.to_string(), "Request cancelled");
        assert_eq!(
            HttpError::Io("reset".to_string()).to_string(),
            "IO error: reset"
        );
    }

    #[test]
    fn test_http_error_is_cancelled() {
        assert!(HttpError::Cancelled.is_cancelled());
        assert!(!HttpError::Timeout("30s".to_string()).is_cancelled());
    }
}
