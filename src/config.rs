//! Request and client configuration.
//!
//! `RequestConfig` describes one HTTP request, `ClientConfig` holds defaults
//! applied to every request a client issues, and `StreamOptions` adds the
//! settings the stream controller recognizes on top of a request.

use std::collections::HashMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::traits::Headers;

/// Default delay between establishment retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Uppercase method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

/// How the response body should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Read the whole body before returning
    #[default]
    Buffered,
    /// Hand back the body as a lazy byte stream
    Streaming,
}

/// Configuration for a single HTTP request.
///
/// # Example
///
/// ```
/// use streamtap::config::{Method, RequestConfig};
///
/// let request = RequestConfig::new("https://api.example.com/events")
///     .with_method(Method::Post)
///     .with_header("Accept", "text/event-stream")
///     .with_body(r#"{"topic":"builds"}"#);
/// assert_eq!(request.method, Method::Post);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// HTTP method
    pub method: Method,
    /// Absolute URL, or a path joined onto the client's base URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: Option<String>,
    /// Whole-request timeout; `None` disables it
    pub timeout: Option<Duration>,
    /// Buffered or streaming body delivery
    pub response_mode: ResponseMode,
}

impl RequestConfig {
    /// Create a GET request for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the response mode.
    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    /// The request the stream controller actually issues: streaming body,
    /// no timeout over the lifetime of the response.
    pub fn for_streaming(mut self) -> Self {
        self.response_mode = ResponseMode::Streaming;
        self.timeout = None;
        self
    }
}

/// Defaults applied to every request issued through a client.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use streamtap::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("https://api.example.com")
///     .with_header("Authorization", "Bearer token")
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(config.base_url.as_deref(), Some("https://api.example.com"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Base URL joined with relative request URLs
    pub base_url: Option<String>,
    /// Headers sent with every request unless the request overrides them
    pub default_headers: Headers,
    /// Default timeout for buffered requests
    pub timeout: Option<Duration>,
    /// User-Agent header value
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Add a default header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Set the default timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Create config from environment variables.
    ///
    /// Reads `STREAMTAP_BASE_URL` and `STREAMTAP_TIMEOUT_SECS`; unset or
    /// unparseable values leave the default in place.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = get("STREAMTAP_BASE_URL").filter(|u| !u.is_empty()) {
            config.base_url = Some(url);
        }
        if let Some(secs) = get("STREAMTAP_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()) {
            config.timeout = Some(Duration::from_secs(secs));
        }
        config
    }

    /// Apply the defaults to a request.
    ///
    /// Request headers win over default headers. The default timeout only
    /// fills in a buffered request that has none; streaming requests keep
    /// whatever they carry.
    pub fn merge(&self, request: RequestConfig) -> RequestConfig {
        let mut headers: Headers = HashMap::new();
        if let Some(agent) = &self.user_agent {
            headers.insert("User-Agent".to_string(), agent.clone());
        }
        headers.extend(self.default_headers.clone());
        headers.extend(request.headers);

        let timeout = match request.response_mode {
            ResponseMode::Buffered => request.timeout.or(self.timeout),
            ResponseMode::Streaming => request.timeout,
        };

        RequestConfig {
            url: self.join_url(&request.url),
            headers,
            timeout,
            ..request
        }
    }

    fn join_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => {
                let base = base.trim_end_matches('/');
                let path = url.trim_start_matches('/');
                if path.is_empty() {
                    base.to_string()
                } else {
                    format!("{}/{}", base, path)
                }
            }
            _ => url.to_string(),
        }
    }
}

/// Options for one streaming session.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use streamtap::config::{RequestConfig, StreamOptions};
///
/// let options = StreamOptions::new(RequestConfig::new("/events"))
///     .with_retry(3)
///     .with_retry_delay(Duration::from_millis(250));
/// assert_eq!(options.retry, 3);
/// ```
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// The request to issue
    pub request: RequestConfig,
    /// Maximum establishment retries after the first attempt
    pub retry: u32,
    /// Delay before each retry
    pub retry_delay: Duration,
    /// Caller-owned abort signal
    pub signal: Option<CancellationToken>,
}

impl StreamOptions {
    /// Create options with no retries and the default delay.
    pub fn new(request: RequestConfig) -> Self {
        Self {
            request,
            retry: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            signal: None,
        }
    }

    /// Set the maximum number of retries.
    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Set the delay between retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Attach an external cancellation signal.
    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }
}

impl From<RequestConfig> for StreamOptions {
    fn from(request: RequestConfig) -> Self {
        Self::new(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn test_for_streaming_overrides_mode_and_timeout() {
        let request = RequestConfig::new("http://x/")
            .with_timeout(Duration::from_secs(5))
            .for_streaming();
        assert_eq!(request.response_mode, ResponseMode::Streaming);
        assert_eq!(request.timeout, None);
    }

    #[test]
    fn test_merge_joins_base_url() {
        let config = ClientConfig::new().with_base_url("http://api.local/v1/");
        assert_eq!(
            config.merge(RequestConfig::new("/events")).url,
            "http://api.local/v1/events"
        );
        assert_eq!(
            config.merge(RequestConfig::new("https://other/x")).url,
            "https://other/x"
        );
        assert_eq!(config.merge(RequestConfig::new("")).url, "http://api.local/v1");
    }

    #[test]
    fn test_merge_request_headers_win() {
        let config = ClientConfig::new()
            .with_header("Accept", "application/json")
            .with_header("X-Team", "core")
            .with_user_agent("streamtap-test");
        let merged = config.merge(RequestConfig::new("http://x").with_header("Accept", "text/event-stream"));
        assert_eq!(merged.headers.get("Accept").unwrap(), "text/event-stream");
        assert_eq!(merged.headers.get("X-Team").unwrap(), "core");
        assert_eq!(merged.headers.get("User-Agent").unwrap(), "streamtap-test");
    }

    #[test]
    fn test_merge_timeout_only_for_buffered() {
        let config = ClientConfig::new().with_timeout(Duration::from_secs(10));
        let buffered = config.merge(RequestConfig::new("http://x"));
        assert_eq!(buffered.timeout, Some(Duration::from_secs(10)));
        let streaming = config.merge(RequestConfig::new("http://x").for_streaming());
        assert_eq!(streaming.timeout, None);
    }

    #[test]
    fn test_from_vars() {
        let config = ClientConfig::from_vars(|key| match key {
            "STREAMTAP_BASE_URL" => Some("http://env.local".to_string()),
            "STREAMTAP_TIMEOUT_SECS" => Some("15".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url.as_deref(), Some("http://env.local"));
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));

        let config = ClientConfig::from_vars(|key| match key {
            "STREAMTAP_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, None);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_stream_options_defaults() {
        let options = StreamOptions::from(RequestConfig::new("http://x"));
        assert_eq!(options.retry, 0);
        assert_eq!(options.retry_delay, Duration::from_millis(1000));
        assert!(options.signal.is_none());
    }
}
