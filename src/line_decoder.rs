//! Byte chunks to lines, buffering partial lines and partial characters across chunk boundaries

use alloc::string::String;

use bytes::{Buf, Bytes, BytesMut};
use bytes_utils::Str;

use crate::{
    constants::{BOM, CR, LF},
    parser::find_eol,
};

/// A decoded line, without its terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: Str,
    /// How many bytes the line took up on the wire, not counting the terminator
    pub byte_len: usize,
}

#[derive(Debug, Clone, Copy, Default)]
enum DecoderState {
    #[default]
    NotStarted,
    Started,
}

impl DecoderState {
    fn is_not_started(&self) -> bool {
        matches!(self, Self::NotStarted)
    }
}

/// Incremental line splitter for one connection attempt.
///
/// Feed it chunks in arrival order with [LineDecoder::decode] (or [LineDecoder::push] + [LineDecoder::next_line]) and pull the completed lines out.
/// Whatever is left without a terminator stays buffered, and is simply dropped along with the decoder.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: BytesMut,
    state: DecoderState,
    // the last line ended on a CR that was the final buffered byte, an LF up next belongs to it
    skip_lf: bool,
}

/// `Some(true)` if `bytes` starts with a BOM, [None] if there aren't enough bytes to tell yet
fn starts_with_bom(bytes: &[u8]) -> Option<bool> {
    if bytes.len() >= BOM.len() {
        Some(bytes.starts_with(BOM))
    } else if BOM.starts_with(bytes) {
        None
    } else {
        Some(false)
    }
}

fn decode_line(line: Bytes) -> Str {
    match core::str::from_utf8(&line) {
        // Safety: we just checked the line is valid utf8
        Ok(_) => unsafe { Str::from_inner_unchecked(line) },
        Err(_) => Str::from(String::from_utf8_lossy(&line).into_owned()),
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns an iterator over every line it completed
    pub fn decode(&mut self, chunk: impl AsRef<[u8]>) -> Lines<'_> {
        self.push(chunk);
        Lines { decoder: self }
    }

    /// Appends `chunk` to the buffer without reading anything out
    pub fn push(&mut self, chunk: impl AsRef<[u8]>) {
        self.buffer.extend_from_slice(chunk.as_ref());
    }

    /// Takes the next complete line out of the buffer, [None] if more bytes are needed
    pub fn next_line(&mut self) -> Option<Line> {
        if self.state.is_not_started() {
            if starts_with_bom(&self.buffer)? {
                self.buffer.advance(BOM.len());
            }
            self.state = DecoderState::Started;
        }

        if self.skip_lf {
            if *self.buffer.first()? == LF {
                self.buffer.advance(1);
            }
            self.skip_lf = false;
        }

        let (line_end, rem_start) = find_eol(&self.buffer)?;
        self.skip_lf = rem_start == self.buffer.len() && self.buffer[line_end] == CR;

        let line = self.buffer.split_to(line_end).freeze();
        self.buffer.advance(rem_start - line_end);

        Some(Line {
            byte_len: line.len(),
            text: decode_line(line),
        })
    }

    /// Number of bytes waiting for a terminator
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Hands back the undecoded bytes, useful if you want to check for leftovers
    pub fn into_remainder(self) -> BytesMut {
        self.buffer
    }
}

/// Lazy iterator returned by [LineDecoder::decode]
#[derive(Debug)]
pub struct Lines<'a> {
    decoder: &'a mut LineDecoder,
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{vec, vec::Vec};
    use rstest::rstest;

    fn texts(decoder: &mut LineDecoder, chunks: &[&[u8]]) -> Vec<Str> {
        chunks
            .iter()
            .flat_map(|chunk| decoder.decode(chunk).map(|line| line.text).collect::<Vec<_>>())
            .collect()
    }

    #[rstest]
    #[case::lf(&["a\nb\n"])]
    #[case::crlf(&["a\r\nb\r\n"])]
    #[case::cr(&["a\rb\r"])]
    #[case::crlf_split(&["a\r", "\nb\r", "\n"])]
    #[case::mixed(&["a\r\n", "b\n"])]
    #[case::byte_at_a_time(&["a", "\r", "\n", "b", "\r"])]
    fn terminators(#[case] chunks: &[&str]) {
        let mut decoder = LineDecoder::new();
        let chunks = chunks.iter().map(|chunk| chunk.as_bytes()).collect::<Vec<_>>();
        assert_eq!(
            texts(&mut decoder, &chunks),
            vec![Str::from("a"), Str::from("b")]
        );
    }

    #[test]
    fn cr_then_lf_is_one_terminator_not_two() {
        let mut decoder = LineDecoder::new();
        assert_eq!(texts(&mut decoder, &[b"a\r"]), vec![Str::from("a")]);
        assert_eq!(texts(&mut decoder, &[b"\n"]), Vec::<Str>::new());
        assert_eq!(texts(&mut decoder, &[b"\n"]), vec![Str::from("")]);
    }

    #[test]
    fn double_cr_is_two_lines() {
        let mut decoder = LineDecoder::new();
        assert_eq!(
            texts(&mut decoder, &[b"data: test\r\r"]),
            vec![Str::from("data: test"), Str::from("")]
        );
    }

    #[test]
    fn multibyte_split_across_chunks() {
        // 👍 is f0 9f 91 8d
        let mut decoder = LineDecoder::new();
        assert!(decoder.decode([b'x', 240, 159]).next().is_none());
        let lines = decoder.decode([145, 141, b'\n']).collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![Line {
                text: Str::from("x👍"),
                byte_len: 5
            }]
        );
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.decode(b"a\xFFb\n").collect::<Vec<_>>();
        assert_eq!(lines[0].text, Str::from("a\u{FFFD}b"));
        assert_eq!(lines[0].byte_len, 3);
    }

    #[test]
    fn byte_len_excludes_terminator() {
        let mut decoder = LineDecoder::new();
        let lens = decoder
            .decode("data: é\r\nid: 1\n\n")
            .map(|line| line.byte_len)
            .collect::<Vec<_>>();
        assert_eq!(lens, vec![8, 5, 0]);
    }

    #[test]
    fn partial_line_is_held_back() {
        let mut decoder = LineDecoder::new();
        assert_eq!(texts(&mut decoder, &[b"data: never finished"]), Vec::<Str>::new());
        assert_eq!(decoder.buffered(), 20);
        assert_eq!(&decoder.into_remainder()[..], b"data: never finished");
    }

    #[test]
    fn bom_handling() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.decode(b"\xEF\xBB\xBFdata\n").collect::<Vec<_>>();
        assert_eq!(lines[0].text, Str::from("data"));
        assert_eq!(lines[0].byte_len, 4);

        // split BOM
        let mut decoder = LineDecoder::new();
        assert_eq!(
            texts(&mut decoder, &[b"\xEF", b"\xBB", b"\xBFdata\n"]),
            vec![Str::from("data")]
        );

        // only the first one goes
        let mut decoder = LineDecoder::new();
        assert_eq!(
            texts(&mut decoder, &[b"a\n\xEF\xBB\xBFb\n"]),
            vec![Str::from("a"), Str::from("\u{FEFF}b")]
        );

        // short first line without BOM
        let mut decoder = LineDecoder::new();
        assert_eq!(
            texts(&mut decoder, &[b":\n", b"data\n"]),
            vec![Str::from(":"), Str::from("data")]
        );
    }
}
