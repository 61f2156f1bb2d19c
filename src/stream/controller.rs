//! The stream controller.
//!
//! Runs one streaming request end to end on its own Tokio task: dispatch,
//! establishment retries, the read/decode/callback pump, and cancellation.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::decoder::Utf8Decoder;
use super::session::{CancelHandle, SessionState, StreamHandle};
use crate::config::{RequestConfig, StreamOptions};
use crate::error::StreamError;
use crate::traits::{ByteStream, HttpClient};

/// How the controller's work ended, before callbacks are invoked.
#[derive(Debug)]
enum Outcome {
    Completed,
    Failed(StreamError),
    Aborted,
}

/// Start a streaming session and return immediately.
///
/// `on_chunk` receives each decoded piece of the body, in order, one at a
/// time. Exactly one of `on_complete` / `on_error` runs at the end, except
/// when the session is stopped by the external signal in
/// [`StreamOptions::signal`], which ends it silently. After the terminal
/// callback no callback runs again.
///
/// Must be called from within a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use streamtap::adapters::ReqwestHttpClient;
/// use streamtap::config::{RequestConfig, StreamOptions};
/// use streamtap::stream::stream;
///
/// let client = Arc::new(ReqwestHttpClient::new());
/// let options = StreamOptions::new(RequestConfig::new("https://example.com/events")).with_retry(2);
/// let handle = stream(
///     client,
///     options,
///     |chunk| print!("{}", chunk),
///     || println!("\n[done]"),
///     |err| eprintln!("stream failed: {}", err),
/// );
/// // later: handle.cancel();
/// ```
pub fn stream<C, F, G, H>(
    client: Arc<C>,
    options: StreamOptions,
    on_chunk: F,
    on_complete: G,
    on_error: H,
) -> StreamHandle
where
    C: HttpClient + ?Sized + 'static,
    F: FnMut(&str) + Send + 'static,
    G: FnOnce() + Send + 'static,
    H: FnOnce(StreamError) + Send + 'static,
{
    let session_id = uuid::Uuid::new_v4().to_string();
    let cancel = CancelHandle::new(CancellationToken::new());
    let (state_tx, state_rx) = watch::channel(SessionState::Pending);

    let span = tracing::info_span!(
        "stream_session",
        session_id = %session_id,
        url = %options.request.url
    );

    let session = Session {
        client,
        request: options.request.for_streaming(),
        max_retries: options.retry,
        retry_delay: options.retry_delay,
        attempts: 0,
        cancel: cancel.clone(),
        signal: options.signal,
        state: state_tx,
    };

    let task = tokio::spawn(
        session
            .run(on_chunk, on_complete, on_error)
            .instrument(span),
    );

    StreamHandle::new(session_id, cancel, state_rx, task)
}

struct Session<C: ?Sized> {
    client: Arc<C>,
    request: RequestConfig,
    max_retries: u32,
    retry_delay: Duration,
    /// Retries performed so far
    attempts: u32,
    cancel: CancelHandle,
    /// Caller-owned signal; only polled while this session runs
    signal: Option<CancellationToken>,
    state: watch::Sender<SessionState>,
}

impl<C> Session<C>
where
    C: HttpClient + ?Sized,
{
    async fn run<F, G, H>(mut self, mut on_chunk: F, on_complete: G, on_error: H) -> SessionState
    where
        F: FnMut(&str),
        G: FnOnce(),
        H: FnOnce(StreamError),
    {
        let outcome = self.drive(&mut on_chunk).await;

        // Cancellation wins over whatever the pump concluded
        let outcome = if self.is_aborted() {
            Outcome::Aborted
        } else {
            outcome
        };

        let state = match outcome {
            Outcome::Completed => {
                tracing::info!("stream completed");
                on_complete();
                SessionState::Completed
            }
            Outcome::Failed(err) => {
                tracing::error!(code = err.error_code(), "stream failed: {}", err);
                on_error(err);
                SessionState::Failed
            }
            Outcome::Aborted => {
                // Propagate an external abort to anything holding our token
                self.cancel.token().cancel();
                if self.cancel.was_manual() {
                    tracing::info!("stream cancelled by caller");
                    on_error(StreamError::Cancelled);
                } else {
                    tracing::info!("stream aborted by signal");
                }
                SessionState::Cancelled
            }
        };

        self.state.send_replace(state);
        state
    }

    async fn drive<F>(&mut self, on_chunk: &mut F) -> Outcome
    where
        F: FnMut(&str),
    {
        if self.is_aborted() {
            tracing::debug!("signal already triggered, request not issued");
            return Outcome::Aborted;
        }

        self.state.send_replace(SessionState::Active);

        let body = match self.establish().await {
            Ok(body) => body,
            Err(outcome) => return outcome,
        };

        self.pump(body, on_chunk).await
    }

    /// Issue the request until it yields a byte stream, retrying
    /// establishment failures up to `max_retries` times.
    async fn establish(&mut self) -> Result<ByteStream, Outcome> {
        loop {
            tracing::debug!(attempt = self.attempts + 1, "dispatching stream request");

            let result = tokio::select! {
                biased;
                _ = self.aborted() => return Err(Outcome::Aborted),
                result = self.client.send_streaming(&self.request, self.cancel.token()) => result,
            };

            let err = match result {
                Ok(response) => {
                    tracing::debug!(status = response.status, "stream established");
                    return response
                        .into_byte_stream()
                        .ok_or(Outcome::Failed(StreamError::Unsupported));
                }
                Err(err) if err.is_cancelled() => return Err(Outcome::Aborted),
                Err(err) => err,
            };

            if self.attempts >= self.max_retries {
                return Err(Outcome::Failed(StreamError::Establish {
                    attempts: self.attempts + 1,
                    source: err,
                }));
            }

            self.attempts += 1;
            tracing::warn!(
                "stream request failed ({}), retry {}/{} in {}ms",
                err,
                self.attempts,
                self.max_retries,
                self.retry_delay.as_millis()
            );

            tokio::select! {
                biased;
                _ = self.aborted() => return Err(Outcome::Aborted),
                _ = tokio::time::sleep(self.retry_delay) => {}
            }
        }
    }

    /// Read, decode and deliver chunks until the body ends.
    async fn pump<F>(&mut self, mut body: ByteStream, on_chunk: &mut F) -> Outcome
    where
        F: FnMut(&str),
    {
        let mut decoder = Utf8Decoder::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = self.aborted() => return Outcome::Aborted,
                next = body.next() => next,
            };

            match next {
                Some(Ok(bytes)) => {
                    let text = decoder.decode(&bytes);
                    tracing::debug!(bytes = bytes.len(), chars = text.len(), "chunk received");
                    if !text.is_empty() {
                        on_chunk(&text);
                    }
                    if self.is_aborted() {
                        return Outcome::Aborted;
                    }
                }
                Some(Err(err)) if err.is_cancelled() => return Outcome::Aborted,
                Some(Err(err)) => return Outcome::Failed(StreamError::Read(err)),
                None => {
                    if let Some(tail) = decoder.finish() {
                        on_chunk(&tail);
                    }
                    return Outcome::Completed;
                }
            }
        }
    }

    /// Resolves once either the session token or the external signal fires.
    async fn aborted(&self) {
        match &self.signal {
            Some(signal) => {
                tokio::select! {
                    _ = self.cancel.token().cancelled() => {}
                    _ = signal.cancelled() => {}
                }
            }
            None => self.cancel.token().cancelled().await,
        }
    }

    fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
            || self
                .signal
                .as_ref()
                .map_or(false, CancellationToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::traits::HttpError;
    use bytes::Bytes;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        chunks: Vec<String>,
        completed: usize,
        errors: Vec<StreamError>,
    }

    fn start(client: &MockHttpClient, options: StreamOptions) -> (StreamHandle, Arc<Mutex<Recorder>>) {
        let recorder = Arc::new(Mutex::new(Recorder::default()));
        let (a, b, c) = (recorder.clone(), recorder.clone(), recorder.clone());
        let handle = stream(
            Arc::new(client.clone()),
            options,
            move |chunk| a.lock().unwrap().chunks.push(chunk.to_string()),
            move || b.lock().unwrap().completed += 1,
            move |err| c.lock().unwrap().errors.push(err),
        );
        (handle, recorder)
    }

    fn options() -> StreamOptions {
        StreamOptions::new(RequestConfig::new("http://mock/stream"))
            .with_retry_delay(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_chunks_then_complete() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Stream(vec![
            Bytes::from("data: a\n\n"),
            Bytes::from("data: b\n\n"),
        ]));

        let (handle, recorder) = start(&client, options());
        assert_eq!(handle.wait().await, SessionState::Completed);

        let recorder = recorder.lock().unwrap();
        assert_eq!(recorder.chunks, vec!["data: a\n\n", "data: b\n\n"]);
        assert_eq!(recorder.completed, 1);
        assert!(recorder.errors.is_empty());
    }

    #[tokio::test]
    async fn test_request_forced_to_streaming_without_timeout() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Stream(vec![]));

        let request = RequestConfig::new("http://mock/stream").with_timeout(Duration::from_secs(1));
        let (handle, _) = start(&client, StreamOptions::new(request));
        handle.wait().await;

        let recorded = &client.get_requests()[0];
        assert!(recorded.streaming);
        assert_eq!(recorded.request.timeout, None);
        assert_eq!(
            recorded.request.response_mode,
            crate::config::ResponseMode::Streaming
        );
    }

    #[tokio::test]
    async fn test_unsupported_body_is_not_retried() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Unstreamed);

        let (handle, recorder) = start(&client, options().with_retry(3));
        assert_eq!(handle.wait().await, SessionState::Failed);

        assert_eq!(client.request_count(), 1);
        assert_eq!(recorder.lock().unwrap().errors, vec![StreamError::Unsupported]);
    }

    #[tokio::test]
    async fn test_retries_exhausted_reports_last_error() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Error(HttpError::ConnectionFailed("1".to_string())));
        client.push_response(MockResponse::Error(HttpError::ConnectionFailed("2".to_string())));
        client.push_response(MockResponse::Error(HttpError::ConnectionFailed("3".to_string())));

        let (handle, recorder) = start(&client, options().with_retry(2));
        assert_eq!(handle.wait().await, SessionState::Failed);

        assert_eq!(client.request_count(), 3);
        let recorder = recorder.lock().unwrap();
        assert_eq!(
            recorder.errors,
            vec![StreamError::Establish {
                attempts: 3,
                source: HttpError::ConnectionFailed("3".to_string()),
            }]
        );
        assert_eq!(recorder.completed, 0);
    }

    #[tokio::test]
    async fn test_state_is_observable() {
        let client = MockHttpClient::new();
        client.push_response(MockResponse::Hang);

        let (handle, _) = start(&client, options());
        tokio::task::yield_now().await;
        while client.request_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(handle.state(), SessionState::Active);

        handle.cancel();
        let cancel = handle.cancel_handle();
        assert_eq!(handle.wait().await, SessionState::Cancelled);
        assert!(cancel.is_cancelled());
    }
}
