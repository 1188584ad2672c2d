//! The seam between [EventSource][super::EventSource] and whatever actually performs HTTP requests

use bytes::Bytes;
use futures_core::{future::BoxFuture, stream::BoxStream};
use http::{HeaderMap, Method, StatusCode};
use tokio_util::sync::CancellationToken;

/// HTTP cache handling asked of the transport, event streams are never cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    NoStore,
}

/// Whether cookies and auth credentials go along with the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsMode {
    SameOrigin,
    Include,
}

impl CredentialsMode {
    pub fn from_with_credentials(with_credentials: bool) -> Self {
        if with_credentials {
            Self::Include
        } else {
            Self::SameOrigin
        }
    }
}

/// Everything a transport needs to issue one connection attempt
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub cache: CacheMode,
    pub credentials: CredentialsMode,
    /// Fires when the source is closed, transports may use it to abort early
    pub cancel: CancellationToken,
}

/// Body of a response as a stream of chunks
pub type ByteStream<E> = BoxStream<'static, Result<Bytes, E>>;

/// Status, headers and (maybe) a body
pub struct TransportResponse<E> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<ByteStream<E>>,
}

impl<E> core::fmt::Debug for TransportResponse<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Issues requests for an [EventSource][super::EventSource].
///
/// The returned future is dropped when the source is closed, so honouring [TransportRequest::cancel] is optional.
pub trait Transport: Send + Sync + 'static {
    type Error: core::error::Error + Send + Sync + 'static;

    fn send(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'static, Result<TransportResponse<Self::Error>, Self::Error>>;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    type Error = T::Error;

    fn send(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'static, Result<TransportResponse<Self::Error>, Self::Error>> {
        (**self).send(request)
    }
}
