//! Mock HTTP client for testing.
//!
//! Provides a scripted mock HTTP client that returns queued responses or
//! errors, one per request, and records every request it sees.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::config::RequestConfig;
use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response, StreamingResponse};

type ChunkIter = futures::stream::Iter<std::vec::IntoIter<Result<Bytes, HttpError>>>;

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a buffered response
    Success(Response),
    /// Fail before any response arrives
    Error(HttpError),
    /// Stream these chunks, then end
    Stream(Vec<Bytes>),
    /// Stream these chunks, then fail the read
    StreamThenError(Vec<Bytes>, HttpError),
    /// Stream these chunks, then stay open until cancelled
    StreamThenHang(Vec<Bytes>),
    /// Respond 200 but expose no byte stream
    Unstreamed,
    /// Never respond; resolves only when cancelled
    Hang,
}

/// A recorded request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The request as the client received it
    pub request: RequestConfig,
    /// Whether it went through `send_streaming`
    pub streaming: bool,
}

/// Mock HTTP client for testing.
///
/// Responses are consumed in the order they were queued; once the queue is
/// empty the default response (if any) is used for every further request.
///
/// # Example
///
/// ```ignore
/// use streamtap::adapters::mock::{MockHttpClient, MockResponse};
/// use streamtap::traits::HttpError;
///
/// let client = MockHttpClient::new();
/// client.push_response(MockResponse::Error(HttpError::Timeout("slow".into())));
/// client.push_response(MockResponse::Stream(vec!["data: hi\n\n".into()]));
///
/// // ... run a session with retry >= 1 ...
/// assert_eq!(client.request_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Scripted responses, one per request
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Response used once the queue runs dry
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unanswered request.
    pub fn push_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Set a default response for requests beyond the queue.
    pub fn set_default_response(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record_request(&self, request: &RequestConfig, streaming: bool) {
        self.requests.lock().unwrap().push(RecordedRequest {
            request: request.clone(),
            streaming,
        });
    }

    fn next_response(&self, url: &str) -> Result<MockResponse, HttpError> {
        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return Ok(response);
        }
        self.default_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| HttpError::Other(format!("No mock response for URL: {}", url)))
    }

    fn chunk_stream(chunks: Vec<Bytes>) -> ChunkIter {
        futures::stream::iter(chunks.into_iter().map(Ok).collect::<Vec<_>>())
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: &RequestConfig) -> Result<Response, HttpError> {
        self.record_request(request, false);

        match self.next_response(&request.url)? {
            MockResponse::Success(response) => Ok(response),
            MockResponse::Error(err) => Err(err),
            MockResponse::Hang => futures::future::pending().await,
            _ => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
        }
    }

    async fn send_streaming(
        &self,
        request: &RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<StreamingResponse, HttpError> {
        self.record_request(request, true);

        let body: ByteStream = match self.next_response(&request.url)? {
            MockResponse::Error(err) => return Err(err),
            MockResponse::Success(_) => {
                return Err(HttpError::Other(
                    "Non-stream response on stream request".to_string(),
                ))
            }
            MockResponse::Unstreamed => {
                return Ok(StreamingResponse::without_body(200, Headers::new()))
            }
            MockResponse::Hang => {
                cancel.cancelled().await;
                return Err(HttpError::Cancelled);
            }
            MockResponse::Stream(chunks) => Box::pin(Self::chunk_stream(chunks)),
            MockResponse::StreamThenError(chunks, err) => {
                let tail = futures::stream::iter([Err::<Bytes, HttpError>(err)]);
                Box::pin(Self::chunk_stream(chunks).chain(tail))
            }
            MockResponse::StreamThenHang(chunks) => {
                // The tail behaves like a transport aborted by the token
                let cancel = cancel.clone();
                let tail = futures::stream::once(async move {
                    cancel.cancelled().await;
                    Err::<Bytes, HttpError>(HttpError::Cancelled)
                });
                Box::pin(Self::chunk_stream(chunks).chain(tail))
            }
        };

        Ok(StreamingResponse::new(200, Headers::new(), body))
    }
}
