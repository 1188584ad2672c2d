use core::{
    pin::Pin,
    task::{Context, Poll, ready},
};

use bytes::BytesMut;
use bytes_utils::Str;
use futures_core::Stream;

use crate::{
    assembler::{Frame, MessageAssembler},
    line_decoder::LineDecoder,
};

pin_project_lite::pin_project! {
    /// [`Stream`][futures_core::Stream] that turns a stream of byte chunks into [`Frame`]s.
    ///
    /// Transport errors are passed through untouched. When the inner stream ends so does this one and an unterminated trailing line is thrown away.
    #[project = EventStreamProjection]
    #[derive(Debug)]
    pub struct EventStream<S> {
        #[pin]
        stream: S,
        decoder: LineDecoder,
        assembler: MessageAssembler,
        terminated: bool,
    }
}

impl<S> EventStream<S> {
    /// Create a new [`EventStream`] from a stream of [`AsRef<[u8]>`][AsRef]
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            decoder: LineDecoder::new(),
            assembler: MessageAssembler::new(),
            terminated: false,
        }
    }

    /// Set the last event id, useful for resumability
    pub fn set_last_event_id(&mut self, id: Option<Str>) {
        self.assembler.set_last_event_id(id)
    }

    /// Reference to the last event id this stream is stamping messages with
    pub fn last_event_id(&self) -> Option<&Str> {
        self.assembler.last_event_id()
    }

    /// Take the undecoded bytes from the [EventStream], useful if you want to check for leftovers
    pub fn take_buffer(self) -> BytesMut {
        self.decoder.into_remainder()
    }
}

impl<'pin, S> EventStreamProjection<'pin, S> {
    fn next_buffered_frame(&mut self) -> Option<Frame> {
        while let Some(line) = self.decoder.next_line() {
            if let Some(frame) = self.assembler.feed_line(&line.text) {
                return Some(frame);
            }
        }
        None
    }
}

impl<S, E, B> Stream for EventStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    type Item = Result<Frame, E>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<<Self as Stream>::Item>> {
        let mut this = self.project();

        if let Some(frame) = this.next_buffered_frame() {
            return Poll::Ready(Some(Ok(frame)));
        }

        if *this.terminated {
            return Poll::Ready(None);
        }

        loop {
            let new_bytes = match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(Ok(o)) => o,
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => {
                    *this.terminated = true;
                    return Poll::Ready(None);
                }
            };

            let new_bytes = new_bytes.as_ref();
            if new_bytes.is_empty() {
                continue;
            }

            this.decoder.push(new_bytes);

            if let Some(frame) = this.next_buffered_frame() {
                return Poll::Ready(Some(Ok(frame)));
            }
        }
    }
}

// tests started life in https://github.com/jpopesculian/eventsource-stream/blob/main/src/event_stream.rs
#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use alloc::{vec, vec::Vec};
    use bytes::Bytes;
    use core::time::Duration;
    use futures::prelude::*;

    async fn messages(chunks: &[&'static [u8]]) -> Vec<Message> {
        EventStream::new(futures::stream::iter(
            chunks
                .iter()
                .copied()
                .map(|chunk| Ok::<_, ()>(Bytes::from_static(chunk))),
        ))
        .try_filter_map(|frame| async move {
            Ok(match frame {
                Frame::Message(message) => Some(message),
                _ => None,
            })
        })
        .try_collect::<Vec<_>>()
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn valid_data_fields() {
        assert_eq!(
            messages(&[b"data: Hello, world!\n\n"]).await,
            vec![Message::new("Hello, world!")]
        );

        assert_eq!(
            messages(&[b"data: Hello,", b" world!\n\n"]).await,
            vec![Message::new("Hello, world!")]
        );

        assert_eq!(
            messages(&[b"data: Hello,", b"", b" world!\n\n"]).await,
            vec![Message::new("Hello, world!")]
        );

        assert_eq!(messages(&[b"data: Hello, world!\n"]).await, vec![]);

        assert_eq!(
            messages(&[b"data: Hello,\ndata: world!\n\n"]).await,
            vec![Message::new("Hello,\nworld!")]
        );

        assert_eq!(
            messages(&[b"data: Hello,\n\ndata: world!\n\n"]).await,
            vec![Message::new("Hello,"), Message::new("world!")]
        );
    }

    #[tokio::test]
    async fn spec_examples() {
        assert_eq!(
            messages(&[
                b"data: This is the first message.

data: This is the second message, it
data: has two lines.

data: This is the third message.

"
            ])
            .await,
            vec![
                Message::new("This is the first message."),
                Message::new("This is the second message, it\nhas two lines."),
                Message::new("This is the third message."),
            ]
        );

        assert_eq!(
            messages(&[
                b"event: add
data: 73857293

event: remove
data: 2153

event: add
data: 113411

"
            ])
            .await,
            vec![
                Message::new("73857293").with_event("add"),
                Message::new("2153").with_event("remove"),
                Message::new("113411").with_event("add"),
            ]
        );

        assert_eq!(
            messages(&[
                b"data: YHOO
data: +2
data: 10

"
            ])
            .await,
            vec![Message::new("YHOO\n+2\n10")]
        );

        assert_eq!(
            messages(&[
                b": test stream

data: first event
id: 1

data:second event
id

data:  third event

"
            ])
            .await,
            vec![
                Message::new("first event").with_id("1"),
                Message::new("second event"),
                Message::new(" third event"),
            ]
        );

        assert_eq!(
            messages(&[
                b"data

data
data

data:
"
            ])
            .await,
            vec![Message::new(""), Message::new("\n")]
        );

        assert_eq!(
            messages(&[
                b"data:test

data: test

"
            ])
            .await,
            vec![Message::new("test"), Message::new("test")]
        );
    }

    #[tokio::test]
    async fn split_field_name() {
        assert_eq!(
            messages(&[b"id: 1\nevent: foo\nda", b"ta: bar\n\n"]).await,
            vec![Message::new("bar").with_event("foo").with_id("1")]
        );
    }

    #[tokio::test]
    async fn side_frames_come_before_their_message() {
        let frames = EventStream::new(futures::stream::iter(vec![Ok::<_, ()>(
            Bytes::from_static(b"retry: 3000\nid: abc\ndata: x\n\n"),
        )]))
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

        assert_eq!(
            frames,
            vec![
                Frame::Retry(Duration::from_millis(3000)),
                Frame::LastEventId(Some(Str::from("abc"))),
                Frame::Message(Message::new("x").with_id("abc")),
            ]
        );
    }

    #[tokio::test]
    async fn seeded_id_is_used() {
        let mut stream = EventStream::new(futures::stream::iter(vec![Ok::<_, ()>(
            Bytes::from_static(b"data: resumed\n\n"),
        )]));
        stream.set_last_event_id(Some(Str::from("41")));
        assert_eq!(stream.last_event_id(), Some(&Str::from("41")));

        assert_eq!(
            stream.next().await,
            Some(Ok(Frame::Message(Message::new("resumed").with_id("41"))))
        );
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let results = EventStream::new(futures::stream::iter(vec![
            Ok::<_, &str>(Bytes::from_static(b"data: a\n\n")),
            Err("connection reset"),
            Ok::<_, &str>(Bytes::from_static(b"data: b\n\n")),
        ]))
        .collect::<Vec<_>>()
        .await;

        assert_eq!(
            results,
            vec![
                Ok(Frame::Message(Message::new("a"))),
                Err("connection reset"),
                Ok(Frame::Message(Message::new("b"))),
            ]
        );
    }

    #[tokio::test]
    async fn trailing_cr_handling() {
        assert_eq!(messages(&[b"data: test\r"]).await, vec![]);
        assert_eq!(
            messages(&[b"data: test\r\r"]).await,
            vec![Message::new("test")]
        );
        assert_eq!(
            messages(&[b"data: test\r", b"\n\r\n"]).await,
            vec![Message::new("test")]
        );
    }

    #[tokio::test]
    async fn leftovers_are_kept_for_inspection() {
        let mut stream = EventStream::new(futures::stream::iter(vec![Ok::<_, ()>(
            Bytes::from_static(b"data: a\n\ndata: half"),
        )]));
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());
        assert_eq!(&stream.take_buffer()[..], b"data: half");
    }
}
