//! Errors surfaced through the `error` notification of an [EventSource][crate::EventSource]

use http::StatusCode;

/// How a failed connection attempt is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `close()` was called, not reported anywhere
    Cancelled,
    /// Worth reconnecting after the backoff
    Transient,
    /// The server answered with something that isn't an event stream, the source closes for good
    Fatal,
}

/// Why a connection attempt ended
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("expected status 200 OK, got {0}")]
    UnexpectedStatus(StatusCode),
    #[error("expected content-type text/event-stream, got {}", .0.as_deref().unwrap_or("nothing"))]
    InvalidContentType(Option<String>),
    #[error("response has no body")]
    MissingBody,
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn core::error::Error + Send + Sync>),
    #[error("stream ended")]
    StreamEnded,
    #[error("connection closed")]
    Cancelled,
}

impl ConnectError {
    pub fn transport(err: impl core::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectError::UnexpectedStatus(_)
            | ConnectError::InvalidContentType(_)
            | ConnectError::MissingBody => ErrorKind::Fatal,
            ConnectError::Transport(_) | ConnectError::StreamEnded => ErrorKind::Transient,
            ConnectError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}
