//! [`Transport`] for [`reqwest::Client`]

use futures_core::future::BoxFuture;
use futures_util::{FutureExt, StreamExt};
use http_body_util::BodyDataStream;
use reqwest::{
    Body, Client, Error as ReqwestError, Response,
    header::{CACHE_CONTROL, HeaderValue},
};

use crate::{
    event_stream::EventStream,
    source::{Transport, TransportRequest, TransportResponse},
};

/// Convert a [`Response`] into an [`EventStream`] via a similar mechanism to [`Response::bytes_stream`], for when you don't want reconnection
pub fn response_to_stream(response: Response) -> EventStream<BodyDataStream<Body>> {
    EventStream::new(BodyDataStream::new(Body::from(response)))
}

/// Requests go out through the client as they are. `reqwest` has no notion of a credentials mode so that part of the request is ignored,
/// and the request future is simply dropped when the source closes.
impl Transport for Client {
    type Error = ReqwestError;

    fn send(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'static, Result<TransportResponse<Self::Error>, Self::Error>> {
        let TransportRequest {
            url,
            method,
            headers,
            body,
            ..
        } = request;

        let mut builder = self
            .request(method, url)
            .headers(headers)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        if let Some(body) = body {
            builder = builder.body(body);
        }

        async move {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = BodyDataStream::new(Body::from(response)).boxed();

            Ok(TransportResponse {
                status,
                headers,
                body: Some(body),
            })
        }
        .boxed()
    }
}
