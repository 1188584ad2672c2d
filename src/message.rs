//! The unit handed to application code, modelled on the `MessageEvent` from <https://html.spec.whatwg.org/multipage/server-sent-events.html>

use bytes_utils::Str;

use crate::constants::MESSAGE_STR;

/// Message dispatched by a [MessageAssembler][crate::assembler::MessageAssembler]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Event type, `"message"` unless the server sent an `event` field
    pub event: Str,
    pub data: Str,
    /// Last event id in effect when the message was dispatched
    pub id: Option<Str>,
}

impl Message {
    /// Builds a message of the default `"message"` type
    pub fn new(data: impl Into<Str>) -> Self {
        Self {
            event: MESSAGE_STR,
            data: data.into(),
            id: None,
        }
    }

    pub fn with_event(mut self, event: impl Into<Str>) -> Self {
        self.event = event.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<Str>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether this message goes to the default `on_message` handler as well as its typed listeners
    pub fn is_default_type(&self) -> bool {
        self.event == MESSAGE_STR
    }
}
