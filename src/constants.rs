use core::time::Duration;

use bytes_utils::Str;

pub(crate) const LF: u8 = b'\n';
pub(crate) const CR: u8 = b'\r';

const BOM_CHAR: char = '\u{FEFF}';
const BOM_LEN: usize = BOM_CHAR.len_utf8();
// bom           = %xFEFF ; U+FEFF BYTE ORDER MARK
pub(crate) const BOM: &[u8; BOM_LEN] = &{
    let mut buf = [0u8; BOM_LEN];
    BOM_CHAR.encode_utf8(&mut buf);
    buf
};

pub(crate) const MESSAGE_STR: Str = Str::from_static("message");

/// Media type servers must answer with, also sent as the `Accept` header
pub const EVENT_STREAM_MEDIA_TYPE: &str = "text/event-stream";

/// Header carrying the resumption cursor on reconnect
pub const LAST_EVENT_ID_HEADER: &str = "last-event-id";

/// Backoff used until the server sends a `retry` field
pub const DEFAULT_RETRY: Duration = Duration::from_millis(1000);
