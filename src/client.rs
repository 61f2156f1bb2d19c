//! Client façade tying an HTTP adapter, client defaults and the stream
//! controller together.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::adapters::ReqwestHttpClient;
use crate::config::{ClientConfig, RequestConfig, StreamOptions};
use crate::error::StreamError;
use crate::sse::{sse_stream_parser, SseEvent};
use crate::stream::{self, CancelHandle, StreamHandle};
use crate::traits::{HttpClient, HttpError, Response};

/// An HTTP client with streaming attached.
///
/// Every request goes through [`ClientConfig::merge`] before reaching the
/// adapter.
///
/// # Example
///
/// ```ignore
/// use streamtap::client::StreamClient;
/// use streamtap::config::{ClientConfig, RequestConfig, StreamOptions};
///
/// let client = StreamClient::new(ClientConfig::from_env().with_base_url("https://api.example.com"));
/// let handle = client.stream_sse(
///     StreamOptions::new(RequestConfig::new("/events")).with_retry(3),
///     |event| println!("{:?}", event),
///     || println!("done"),
///     |err| eprintln!("{}", err),
/// );
/// handle.wait().await;
/// ```
#[derive(Debug)]
pub struct StreamClient<C: ?Sized = ReqwestHttpClient> {
    client: Arc<C>,
    config: ClientConfig,
}

impl<C: ?Sized> Clone for StreamClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: self.config.clone(),
        }
    }
}

impl StreamClient<ReqwestHttpClient> {
    /// Construct a pre-configured reqwest-backed client.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Arc::new(ReqwestHttpClient::new()),
            config,
        }
    }
}

impl Default for StreamClient<ReqwestHttpClient> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<C> StreamClient<C>
where
    C: HttpClient + ?Sized + 'static,
{
    /// Attach streaming to an existing HTTP client.
    pub fn attach(client: Arc<C>) -> Self {
        Self {
            client,
            config: ClientConfig::default(),
        }
    }

    /// Replace the client defaults.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// The client defaults.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying HTTP adapter.
    pub fn inner(&self) -> &Arc<C> {
        &self.client
    }

    /// Issue an ordinary buffered request.
    pub async fn request(&self, request: RequestConfig) -> Result<Response, HttpError> {
        self.client.send(&self.config.merge(request)).await
    }

    /// Start a streaming session. See [`crate::stream::stream`].
    pub fn stream<F, G, H>(
        &self,
        options: StreamOptions,
        on_chunk: F,
        on_complete: G,
        on_error: H,
    ) -> StreamHandle
    where
        F: FnMut(&str) + Send + 'static,
        G: FnOnce() + Send + 'static,
        H: FnOnce(StreamError) + Send + 'static,
    {
        let options = self.prepare(options);
        stream::stream(
            Arc::clone(&self.client),
            options,
            on_chunk,
            on_complete,
            on_error,
        )
    }

    /// Start a streaming session whose body is parsed as SSE.
    ///
    /// Events are emitted whole, once their closing blank line has arrived.
    pub fn stream_sse<E, G, H>(
        &self,
        options: StreamOptions,
        on_event: E,
        on_complete: G,
        on_error: H,
    ) -> StreamHandle
    where
        E: FnMut(SseEvent) + Send + 'static,
        G: FnOnce() + Send + 'static,
        H: FnOnce(StreamError) + Send + 'static,
    {
        self.stream(options, sse_stream_parser(on_event), on_complete, on_error)
    }

    /// Start a streaming session exposed as a [`futures::Stream`] of chunks.
    ///
    /// The stream yields `Ok(chunk)` per decoded chunk, at most one `Err`,
    /// then ends. Chunks are buffered without bound until polled. Dropping
    /// the returned stream cancels the session.
    pub fn chunk_stream(&self, options: StreamOptions) -> ChunkStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let chunk_tx = tx.clone();
        let error_tx = tx;

        let handle = self.stream(
            options,
            move |chunk| {
                let _ = chunk_tx.send(Ok(chunk.to_string()));
            },
            || {},
            move |err| {
                let _ = error_tx.send(Err(err));
            },
        );

        ChunkStream {
            rx,
            cancel: handle.cancel_handle(),
        }
    }

    fn prepare(&self, mut options: StreamOptions) -> StreamOptions {
        options.request = self.config.merge(options.request.for_streaming());
        options
    }
}

/// Chunks of one session as an async stream.
#[derive(Debug)]
pub struct ChunkStream {
    rx: mpsc::UnboundedReceiver<Result<String, StreamError>>,
    cancel: CancelHandle,
}

impl ChunkStream {
    /// Cancel the session; the stream then yields the cancellation error.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A cancel capability that outlives borrows of the stream.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

impl Stream for ChunkStream {
    type Item = Result<String, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for ChunkStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
