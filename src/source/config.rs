use core::time::Duration;

use bytes::Bytes;
use bytes_utils::Str;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

use crate::constants::DEFAULT_RETRY;

/// Settings for an [EventSource][super::EventSource].
///
/// `Accept`, `Last-Event-ID`, caching and cancellation are owned by the source, everything else here is passed to the transport as is.
///
/// ```rust
/// use std::time::Duration;
/// use sselink::source::EventSourceConfig;
///
/// let config = EventSourceConfig::new()
///     .with_retry(Duration::from_secs(3))
///     .with_credentials(true);
///
/// assert_eq!(config.retry, Duration::from_secs(3));
/// assert!(!config.disable_retry);
/// ```
#[derive(Debug, Clone)]
pub struct EventSourceConfig {
    /// Never reconnect, the source closes the first time the stream drops
    pub disable_retry: bool,
    /// Backoff before a reconnect, until the server sends its own `retry`
    pub retry: Duration,
    pub with_credentials: bool,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Cursor to resume from on the very first request
    pub last_event_id: Option<Str>,
}

impl Default for EventSourceConfig {
    fn default() -> Self {
        Self {
            disable_retry: false,
            retry: DEFAULT_RETRY,
            with_credentials: false,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            last_event_id: None,
        }
    }
}

impl EventSourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry(mut self, retry: Duration) -> Self {
        self.retry = retry;
        self
    }

    pub fn disable_retry(mut self) -> Self {
        self.disable_retry = true;
        self
    }

    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_last_event_id(mut self, id: impl Into<Str>) -> Self {
        self.last_event_id = Some(id.into());
        self
    }
}
