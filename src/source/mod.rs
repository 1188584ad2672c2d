//! A reconnecting event source.
//!
//! [EventSource] owns one logical connection at a time. It asks a [Transport] for the stream, runs the body through an
//! [EventStream], tells listeners about what happens and reconnects after the backoff when the stream drops.
//! The server can move the backoff with `retry` fields and the last `id` it sent goes back out as `Last-Event-ID`.
//!
//! ```rust,no_run
//! # use sselink::source::{EventSource, EventSourceConfig, Transport};
//! # fn demo<T: Transport>(transport: T) {
//! let source = EventSource::new(transport, "https://example.com/events", EventSourceConfig::new());
//! source.set_on_message(Some(sselink::source::listener(|notification| {
//!     println!("{notification:?}");
//! })));
//! source.start();
//! # }
//! ```

mod config;
mod listeners;
mod transport;


use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use bytes_utils::Str;
use futures_timer::Delay;
use futures_util::StreamExt;
use http::{
    HeaderName, HeaderValue, StatusCode,
    header::{ACCEPT, CONTENT_TYPE},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

pub use config::EventSourceConfig;
pub use listeners::{Listener, Notification, Phase, RetryHook, listener};
pub use transport::{
    ByteStream, CacheMode, CredentialsMode, Transport, TransportRequest, TransportResponse,
};

use crate::{
    assembler::Frame,
    constants::{EVENT_STREAM_MEDIA_TYPE, LAST_EVENT_ID_HEADER},
    errors::{ConnectError, ErrorKind},
    event_stream::EventStream,
};
use listeners::{Handlers, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReadyState {
    Connecting,
    Open,
    /// Terminal, reached through [EventSource::close] or a fatal response
    Closed,
}

/// What survives from one connection attempt to the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub last_event_id: Option<Str>,
    pub retry: Duration,
}

/// What to do once a connection attempt has ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing, someone already closed the source
    Stop,
    /// Move to [ReadyState::Closed] and stay there
    Close,
    /// Wait out the backoff and connect again
    Reconnect,
}

pub fn next_step(kind: ErrorKind, state: ReadyState, disable_retry: bool) -> Step {
    match kind {
        ErrorKind::Cancelled => Step::Stop,
        ErrorKind::Fatal => Step::Close,
        ErrorKind::Transient if state == ReadyState::Closed => Step::Stop,
        ErrorKind::Transient if disable_retry => Step::Close,
        ErrorKind::Transient => Step::Reconnect,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // a panicking listener shouldn't take the whole source down with it
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Shared {
    url: String,
    state: Mutex<ReadyState>,
    cursor: Mutex<Cursor>,
    registry: Mutex<Registry>,
    handlers: Mutex<Handlers>,
    cancel: CancellationToken,
    started: AtomicBool,
}

impl Shared {
    fn ready_state(&self) -> ReadyState {
        *lock(&self.state)
    }

    /// Returns false, without changing anything, once the source is closed
    fn transition(&self, to: ReadyState) -> bool {
        let mut state = lock(&self.state);
        if *state == ReadyState::Closed {
            return false;
        }
        *state = to;
        true
    }

    fn close(&self) {
        let mut state = lock(&self.state);
        if *state != ReadyState::Closed {
            debug!(url = %self.url, "closing event source");
            *state = ReadyState::Closed;
        }
        drop(state);
        self.cancel.cancel();
    }

    fn cursor(&self) -> Cursor {
        lock(&self.cursor).clone()
    }

    fn notify(&self, notification: &Notification<'_>) {
        let listeners = lock(&self.registry).listeners_for(notification.kind());
        for listener in listeners {
            listener(notification);
        }

        let handler = {
            let handlers = lock(&self.handlers);
            match notification {
                Notification::Open => handlers.on_open.clone(),
                Notification::Error(_) => handlers.on_error.clone(),
                Notification::Message(message) if message.is_default_type() => {
                    handlers.on_message.clone()
                }
                Notification::Message(_) => None,
            }
        };
        if let Some(handler) = handler {
            handler(notification);
        }
    }

    fn apply(&self, frame: Frame) {
        match frame {
            Frame::LastEventId(id) => {
                trace!(url = %self.url, last_event_id = ?id, "last event id updated");
                lock(&self.cursor).last_event_id = id;
            }
            Frame::Retry(retry) => {
                debug!(url = %self.url, ?retry, "server changed retry interval");
                lock(&self.cursor).retry = retry;
                let hook = lock(&self.handlers).on_retry_change.clone();
                if let Some(hook) = hook {
                    hook(retry);
                }
            }
            Frame::Message(message) => self.notify(&Notification::Message(&message)),
        }
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("url", &self.url)
            .field("state", &self.ready_state())
            .field("cursor", &self.cursor())
            .field("registry", &*lock(&self.registry))
            .finish_non_exhaustive()
    }
}

/// Client side of an event stream, see the [module docs][self].
///
/// Dropping it closes the connection.
#[derive(Debug)]
pub struct EventSource<T> {
    shared: Arc<Shared>,
    transport: Arc<T>,
    config: Arc<EventSourceConfig>,
}

/// Cloneable handle that can only close its [EventSource], handy inside listeners
#[derive(Debug, Clone)]
pub struct Closer {
    shared: Arc<Shared>,
}

impl Closer {
    pub fn close(&self) {
        self.shared.close()
    }
}

impl<T: Transport> EventSource<T> {
    /// Creates an idle source in [ReadyState::Connecting], nothing is sent until [EventSource::start]
    pub fn new(transport: T, url: impl Into<String>, config: EventSourceConfig) -> Self {
        let shared = Shared {
            url: url.into(),
            state: Mutex::new(ReadyState::Connecting),
            cursor: Mutex::new(Cursor {
                last_event_id: config.last_event_id.clone(),
                retry: config.retry,
            }),
            registry: Mutex::new(Registry::default()),
            handlers: Mutex::new(Handlers::default()),
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
        };
        Self {
            shared: Arc::new(shared),
            transport: Arc::new(transport),
            config: Arc::new(config),
        }
    }

    /// [EventSource::new] followed by [EventSource::start]
    pub fn connect(transport: T, url: impl Into<String>, config: EventSourceConfig) -> Self {
        let source = Self::new(transport, url, config);
        source.start();
        source
    }

    /// Spawns the connection task on the current tokio runtime. Calling it again, or after close, does nothing.
    pub fn start(&self) {
        if self.ready_state() == ReadyState::Closed {
            debug!(url = %self.shared.url, "not starting a closed event source");
            return;
        }
        if self.shared.started.swap(true, Ordering::SeqCst) {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(run(
                    self.shared.clone(),
                    self.transport.clone(),
                    self.config.clone(),
                ));
            }
            Err(err) => {
                warn!(url = %self.shared.url, error = %err, "no tokio runtime to drive the event source");
                self.shared.started.store(false, Ordering::SeqCst);
            }
        }
    }
}

impl<T> EventSource<T> {
    /// Closes the source for good. Cancels the in-flight request or read and any pending reconnect, no error is reported.
    pub fn close(&self) {
        self.shared.close()
    }

    pub fn closer(&self) -> Closer {
        Closer {
            shared: self.shared.clone(),
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        self.shared.ready_state()
    }

    /// Delay the next reconnect will wait
    pub fn retry_interval(&self) -> Duration {
        lock(&self.shared.cursor).retry
    }

    pub fn last_event_id(&self) -> Option<Str> {
        lock(&self.shared.cursor).last_event_id.clone()
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }

    /// Registers `listener` for notifications of type `kind`. Returns false if that exact registration already exists.
    pub fn add_event_listener(&self, kind: &str, listener: Listener, phase: Phase) -> bool {
        lock(&self.shared.registry).add(kind, listener, phase)
    }

    pub fn remove_event_listener(&self, kind: &str, listener: &Listener, phase: Phase) -> bool {
        lock(&self.shared.registry).remove(kind, listener, phase)
    }

    pub fn set_on_open(&self, handler: Option<Listener>) {
        lock(&self.shared.handlers).on_open = handler;
    }

    /// Handler for messages of the default `"message"` type, runs after the typed listeners
    pub fn set_on_message(&self, handler: Option<Listener>) {
        lock(&self.shared.handlers).on_message = handler;
    }

    pub fn set_on_error(&self, handler: Option<Listener>) {
        lock(&self.shared.handlers).on_error = handler;
    }

    pub fn set_on_retry_change(&self, hook: Option<RetryHook>) {
        lock(&self.shared.handlers).on_retry_change = hook;
    }
}

impl<T> Drop for EventSource<T> {
    fn drop(&mut self) {
        self.shared.close();
    }
}

fn build_request(
    url: &str,
    config: &EventSourceConfig,
    last_event_id: Option<&Str>,
    cancel: CancellationToken,
) -> TransportRequest {
    let mut headers = config.headers.clone();
    headers.insert(ACCEPT, HeaderValue::from_static(EVENT_STREAM_MEDIA_TYPE));

    if let Some(id) = last_event_id {
        match HeaderValue::from_str(id) {
            Ok(value) => {
                headers.insert(HeaderName::from_static(LAST_EVENT_ID_HEADER), value);
            }
            Err(_) => {
                warn!(%url, last_event_id = &**id, "last event id can't be sent as a header, resuming without it")
            }
        }
    }

    TransportRequest {
        url: url.to_owned(),
        method: config.method.clone(),
        headers,
        body: config.body.clone(),
        cache: CacheMode::NoStore,
        credentials: CredentialsMode::from_with_credentials(config.with_credentials),
        cancel,
    }
}

fn check_response<E>(response: TransportResponse<E>) -> Result<ByteStream<E>, ConnectError> {
    if response.status != StatusCode::OK {
        return Err(ConnectError::UnexpectedStatus(response.status));
    }

    let content_type = response
        .headers
        .get(CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
    let is_event_stream = content_type
        .as_deref()
        .is_some_and(|value| value.to_ascii_lowercase().contains(EVENT_STREAM_MEDIA_TYPE));
    if !is_event_stream {
        return Err(ConnectError::InvalidContentType(content_type));
    }

    response.body.ok_or(ConnectError::MissingBody)
}

/// One connection attempt, returns why it ended
async fn attempt<T: Transport>(
    shared: &Shared,
    transport: &T,
    config: &EventSourceConfig,
) -> ConnectError {
    let cursor = shared.cursor();
    debug!(url = %shared.url, last_event_id = ?cursor.last_event_id, "connecting");

    let request = build_request(
        &shared.url,
        config,
        cursor.last_event_id.as_ref(),
        shared.cancel.clone(),
    );
    let response = tokio::select! {
        biased;
        _ = shared.cancel.cancelled() => return ConnectError::Cancelled,
        response = transport.send(request) => response,
    };
    let response = match response {
        Ok(response) => response,
        Err(_) if shared.cancel.is_cancelled() => return ConnectError::Cancelled,
        Err(err) => return ConnectError::transport(err),
    };
    let body = match check_response(response) {
        Ok(body) => body,
        Err(err) => return err,
    };

    if !shared.transition(ReadyState::Open) {
        return ConnectError::Cancelled;
    }
    debug!(url = %shared.url, "connection open");
    shared.notify(&Notification::Open);

    let mut stream = EventStream::new(body);
    stream.set_last_event_id(cursor.last_event_id);

    loop {
        let next = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => return ConnectError::Cancelled,
            next = stream.next() => next,
        };
        match next {
            Some(Ok(frame)) => shared.apply(frame),
            Some(Err(_)) if shared.cancel.is_cancelled() => return ConnectError::Cancelled,
            Some(Err(err)) => return ConnectError::transport(err),
            None => return ConnectError::StreamEnded,
        }
    }
}

async fn run<T: Transport>(
    shared: Arc<Shared>,
    transport: Arc<T>,
    config: Arc<EventSourceConfig>,
) {
    while shared.transition(ReadyState::Connecting) {
        let err = attempt(&shared, transport.as_ref(), &config).await;
        let kind = err.kind();

        match kind {
            ErrorKind::Cancelled => {
                debug!(url = %shared.url, "connection task cancelled");
                return;
            }
            ErrorKind::Fatal => {
                warn!(url = %shared.url, error = %err, "event source failed");
                shared.close();
            }
            ErrorKind::Transient => debug!(url = %shared.url, error = %err, "connection lost"),
        }
        shared.notify(&Notification::Error(&err));

        match next_step(kind, shared.ready_state(), config.disable_retry) {
            Step::Stop => return,
            Step::Close => {
                shared.close();
                return;
            }
            Step::Reconnect => {}
        }

        if !shared.transition(ReadyState::Connecting) {
            return;
        }
        let delay = lock(&shared.cursor).retry;
        info!(url = %shared.url, ?delay, "reconnecting");
        tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => {
                debug!(url = %shared.url, "reconnect cancelled");
                return;
            }
            _ = Delay::new(delay) => {}
        }
    }
}
