//! Line level parsing for SSE, split from the buffering so each half can be used on its own

use crate::constants::{CR, LF};

/// Field names recognised by the [event stream interpretation](https://html.spec.whatwg.org/multipage/server-sent-events.html#event-stream-interpretation) rules, anything else ends up in [FieldName::Ignored]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldName {
    Event,
    Data,
    Id,
    Retry,
    Ignored,
}

impl FieldName {
    fn from_name(name: &str) -> Self {
        match name {
            "event" => FieldName::Event,
            "data" => FieldName::Data,
            "id" => FieldName::Id,
            "retry" => FieldName::Retry,
            _ => FieldName::Ignored,
        }
    }
}

/// A single decoded line from an SSE stream, borrowing from the line text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLine<'a> {
    /// Blank line, dispatches the pending message
    Empty,
    Comment, // the comment body is never used so we don't keep it
    Field { name: FieldName, value: &'a str },
}

/// Finds the next EOL in `bytes`. Returns a tuple where the first value is the non-inclusive end of the line and the second value is the inclusive start of the remainder.
///
/// A CR that is the final byte terminates its line straight away, the caller has to remember to skip an LF that might turn up next.
/// Returns [None] if `bytes` has no CR or LF at all.
pub fn find_eol(bytes: &[u8]) -> Option<(usize, usize)> {
    let first_match = memchr::memchr2(CR, LF, bytes)?;

    match bytes[first_match] {
        CR if bytes.get(first_match + 1) == Some(&LF) => Some((first_match, first_match + 2)),
        // lone LF, lone CR or CR at the end of what we have so far
        _ => Some((first_match, first_match + 1)),
    }
}

/// Classifies one line (without its terminator).
///
/// Lines without a colon are a field name with an empty value, a single space after the colon is stripped.
pub fn parse_line(line: &str) -> EventLine<'_> {
    if line.is_empty() {
        return EventLine::Empty;
    }

    match memchr::memchr(b':', line.as_bytes()) {
        Some(0) => EventLine::Comment,
        Some(colon_pos) => {
            let value = &line[colon_pos + 1..];
            let value = value.strip_prefix(' ').unwrap_or(value);
            EventLine::Field {
                name: FieldName::from_name(&line[..colon_pos]),
                value,
            }
        }
        None => EventLine::Field {
            name: FieldName::from_name(line),
            value: "",
        },
    }
}
