//! Incremental decoding of [Server-Sent Events](https://html.spec.whatwg.org/multipage/server-sent-events.html) (SSE)
//! and a reconnecting client built on top of it.
//!
//! `sselink` is layered, each stage usable on its own:
//!
//! - [`LineDecoder`][line_decoder::LineDecoder] - byte chunks in, complete lines out. Copes with chunk boundaries
//!   that split a `\r\n` or a multi-byte character.
//! - [`MessageAssembler`][assembler::MessageAssembler] - lines in, [`Frame`][assembler::Frame]s out: finished
//!   [`Message`][message::Message]s plus `id` and `retry` updates the moment they are read.
//! - [`EventStream`] - a [`Stream`][futures_core::Stream] adapter that runs any
//!   `Stream<Item = Result<impl AsRef<[u8]>, E>>` through both of the above.
//! - [`EventSource`] (requires `std`) - owns a connection, reconnects with a server-adjustable backoff, resumes with
//!   `Last-Event-ID` and reports to listeners. The HTTP side is pluggable through [`Transport`][source::Transport],
//!   the `reqwest` feature provides one for [`reqwest::Client`][::reqwest::Client].
//! - [`JsonStream`][json_stream::JsonStream] (requires `json`) - deserialises each message's `data` into a typed value.
//!
//! # Using `EventStream` directly
//!
//! ```rust
//! use bytes::Bytes;
//! use futures::StreamExt;
//! use sselink::{EventStream, assembler::Frame};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let chunks = vec![
//!     Ok::<_, std::io::Error>(Bytes::from("id: 1\nevent: greeting\nda")),
//!     Ok(Bytes::from("ta: hello\n\n")),
//! ];
//! let mut stream = EventStream::new(futures::stream::iter(chunks));
//!
//! while let Some(Ok(frame)) = stream.next().await {
//!     if let Frame::Message(message) = frame {
//!         assert_eq!(&*message.event, "greeting");
//!         assert_eq!(&*message.data, "hello");
//!     }
//! }
//! # }
//! ```
//!
//! # Reconnecting with `reqwest`
//!
//! ```ignore
//! use sselink::{EventSource, source::{EventSourceConfig, Phase, listener}};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let source = EventSource::connect(
//!     reqwest::Client::new(),
//!     "https://example.com/events",
//!     EventSourceConfig::new(),
//! );
//! source.add_event_listener("update", listener(|n| println!("{n:?}")), Phase::Bubble);
//! # }
//! ```
//!
//! # Feature flags
//!
//! | Feature | Default | Description | no std? |
//! | --- | --- | --- | --- |
//! | `std` | on | Enables [`EventSource`] and the runtime stack behind it (`tokio`, `tracing`, `http`) plus std support in the core dependencies. | false |
//! | `reqwest` | off | [`Transport`][source::Transport] for [`reqwest::Client`][::reqwest::Client] and [`response_to_stream`]. | false |
//! | `serde` | off | Derives [`Serialize`][::serde::Serialize] and [`Deserialize`][::serde::Deserialize] on [`Message`][message::Message] and [`ReadyState`][source::ReadyState]. | false |
//! | `json` | off | [`JsonStream`][json_stream::JsonStream], with plain [`serde_json`] errors or [`serde_path_to_error`] ones. | false |
//!
//! With `default-features = false` the crate is `no_std` (it still needs `alloc`) and provides the decoder, the
//! assembler and [`EventStream`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod assembler;
pub mod constants;
pub mod event_stream;
pub mod line_decoder;
pub mod message;
pub mod parser;

#[cfg(feature = "std")]
pub mod errors;
#[cfg(feature = "std")]
pub mod source;

#[cfg(feature = "json")]
pub mod json_stream;
#[cfg(feature = "reqwest")]
pub mod reqwest;

pub use event_stream::EventStream;
#[cfg(feature = "std")]
pub use source::EventSource;

#[cfg(feature = "reqwest")]
pub use crate::reqwest::response_to_stream;
