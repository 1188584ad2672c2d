//! Lines to messages

use core::time::Duration;

use alloc::string::String;

use bytes_utils::{Str, StrMut};

use crate::{
    constants::{LF, MESSAGE_STR},
    message::Message,
    parser::{EventLine, FieldName, parse_line},
};

/// What a single line turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A blank line completed a message
    Message(Message),
    /// An `id` field changed the last event id.
    /// [None] when an empty id cleared it, the next connection then goes out without a `Last-Event-ID` header.
    LastEventId(Option<Str>),
    /// A `retry` field asked for a new reconnection delay
    Retry(Duration),
}

/// Accumulates fields line by line and hands out a [Frame] whenever a line means something to the caller.
///
/// Never fails, anything it can't make sense of is dropped.
#[derive(Debug, Clone)]
pub struct MessageAssembler {
    event: Option<Str>,
    data_buffer: StrMut,
    id: Option<Str>,
    // any of event/data/id/retry seen since the last blank line
    has_fields: bool,
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self {
            event: None,
            data_buffer: StrMut::new(),
            id: None,
            has_fields: false,
        }
    }
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an id carried over from an earlier connection
    pub fn with_last_event_id(id: Option<Str>) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn set_last_event_id(&mut self, id: Option<Str>) {
        self.id = id;
    }

    /// The id messages are currently stamped with
    pub fn last_event_id(&self) -> Option<&Str> {
        self.id.as_ref()
    }

    /// Feeds one line, terminator already stripped. Copies the line once, [MessageAssembler::feed_line] avoids that.
    pub fn feed(&mut self, line: &str) -> Option<Frame> {
        self.feed_line(&Str::from(String::from(line)))
    }

    /// Feeds one decoded line, `event` and `id` values are slices of it rather than copies
    pub fn feed_line(&mut self, line: &Str) -> Option<Frame> {
        match parse_line(line) {
            EventLine::Empty => self.dispatch().map(Frame::Message),
            EventLine::Comment => None,
            EventLine::Field { name, value } => self.add_field(line, name, value),
        }
    }

    fn add_field(&mut self, line: &Str, name: FieldName, value: &str) -> Option<Frame> {
        match name {
            FieldName::Event => {
                self.event = Some(line.slice_ref(value));
                self.has_fields = true;
                None
            }
            FieldName::Data => {
                self.data_buffer.push_str(value);
                self.data_buffer.push('\n');
                self.has_fields = true;
                None
            }
            FieldName::Id => {
                if memchr::memchr(0, value.as_bytes()).is_some() {
                    return None;
                }
                self.id = (!value.is_empty()).then(|| line.slice_ref(value));
                self.has_fields = true;
                Some(Frame::LastEventId(self.id.clone()))
            }
            FieldName::Retry => {
                if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                // all digits but too big for a u64 gets ignored too
                let millis = value.parse::<u64>().ok()?;
                self.has_fields = true;
                Some(Frame::Retry(Duration::from_millis(millis)))
            }
            FieldName::Ignored => None,
        }
    }

    /// Handles a blank line. The event type and data always reset, the id stays until an `id` field replaces it.
    fn dispatch(&mut self) -> Option<Message> {
        let had_fields = core::mem::take(&mut self.has_fields);
        let event = self.event.take();
        let data_buffer = core::mem::replace(&mut self.data_buffer, StrMut::new());

        if !had_fields {
            return None;
        }

        let mut buf = data_buffer.into_inner();
        if buf.last() == Some(&LF) {
            buf.truncate(buf.len() - 1);
        }
        // Safety: we only ever removed a trailing LF, which can't be part of another utf-8 codepoint
        let data = unsafe { StrMut::from_inner_unchecked(buf) };

        Some(Message {
            event: event.filter(|event| !event.is_empty()).unwrap_or(MESSAGE_STR),
            data: data.freeze(),
            id: self.id.clone(),
        })
    }
}
