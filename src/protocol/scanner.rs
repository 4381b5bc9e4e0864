//! Frame scanner for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for body accumulation and an explicit state
//! machine for fragmented frames:
//! - `ScanningHeaders`: collecting header lines until the blank line
//! - `ReadingBody`: headers complete, need N more body bytes
//!
//! Carriage returns are ignored; a line feed terminates a header line; a
//! line feed on an empty line completes the header block. A block without a
//! Content-Length header drops the frame without consuming any body bytes,
//! and scanning continues with the next byte. Body bytes are decoded under
//! the frame's charset (default UTF-8); a decode failure drops the frame.
//!
//! # Example
//!
//! ```
//! use lspwire::protocol::{FrameScanner, ScanEvent};
//!
//! let mut scanner = FrameScanner::new();
//! let events = scanner.push(b"Content-Length: 2\r\n\r\nhi");
//!
//! assert!(matches!(&events[..], [ScanEvent::Text(t)] if t == "hi"));
//! ```

use bytes::BytesMut;
use encoding_rs::Encoding;

use super::headers::FrameHeaders;
use crate::error::WireError;

/// State machine for frame scanning.
#[derive(Debug)]
enum State {
    /// Accumulating header lines until the blank line.
    ScanningHeaders,
    /// Headers complete, collecting body bytes.
    ReadingBody { remaining: usize },
}

/// One outcome produced by [`FrameScanner::push`].
#[derive(Debug)]
pub enum ScanEvent {
    /// A complete frame body, decoded to text.
    Text(String),
    /// A frame discarded without dispatch; scanning continues.
    Dropped(WireError),
}

/// Accumulates incoming bytes and extracts complete frames.
///
/// Push-based: callers feed whatever the underlying read returned (possibly
/// a single byte) and collect zero or more events per push. Header state
/// resets to a fresh instance after every completed or dropped frame.
pub struct FrameScanner {
    state: State,
    /// Current header line, excluding terminators.
    line: Vec<u8>,
    /// All header lines of the current block, kept for error reporting.
    header_block: String,
    headers: FrameHeaders,
    body: BytesMut,
}

impl FrameScanner {
    /// Create a new scanner in the header-scanning state.
    pub fn new() -> Self {
        Self {
            state: State::ScanningHeaders,
            line: Vec::new(),
            header_block: String::new(),
            headers: FrameHeaders::default(),
            body: BytesMut::new(),
        }
    }

    /// Push data into the scanner and extract all complete frames.
    ///
    /// Returns one event per frame completed or dropped within `data`.
    /// Partial state is buffered internally for the next push.
    pub fn push(&mut self, data: &[u8]) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            match self.state {
                State::ScanningHeaders => {
                    let byte = data[pos];
                    pos += 1;
                    match byte {
                        b'\r' => {}
                        b'\n' => {
                            if self.line.is_empty() {
                                self.finish_headers(&mut events);
                            } else {
                                self.finish_header_line();
                            }
                        }
                        other => self.line.push(other),
                    }
                }
                State::ReadingBody { remaining } => {
                    let take = remaining.min(data.len() - pos);
                    self.body.extend_from_slice(&data[pos..pos + take]);
                    pos += take;

                    if take == remaining {
                        events.push(self.finish_body());
                    } else {
                        self.state = State::ReadingBody {
                            remaining: remaining - take,
                        };
                    }
                }
            }
        }

        events
    }

    /// Complete one header line and feed it to the header parser.
    fn finish_header_line(&mut self) {
        let line = String::from_utf8_lossy(&self.line).into_owned();
        self.header_block.push_str(&line);
        self.header_block.push('\n');
        self.headers.parse_line(&line);
        self.line.clear();
    }

    /// Handle the blank line ending a header block.
    fn finish_headers(&mut self, events: &mut Vec<ScanEvent>) {
        match self.headers.content_length {
            Some(0) => {
                // Nothing to read; complete the frame in place.
                events.push(self.finish_body());
            }
            Some(length) => {
                self.body.reserve(length);
                self.state = State::ReadingBody { remaining: length };
            }
            None => {
                let block = std::mem::take(&mut self.header_block);
                events.push(ScanEvent::Dropped(WireError::MissingContentLength(block)));
                self.reset();
            }
        }
    }

    /// Decode the collected body under the frame's charset and reset.
    fn finish_body(&mut self) -> ScanEvent {
        let label = self.headers.charset_label().to_string();
        let bytes = self.body.split();
        self.reset();

        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            return ScanEvent::Dropped(WireError::UnsupportedCharset(label));
        };
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes);
        if had_errors {
            return ScanEvent::Dropped(WireError::UnsupportedCharset(format!(
                "body is not valid {}",
                encoding.name()
            )));
        }
        ScanEvent::Text(text.into_owned())
    }

    /// Reset per-frame state; the next byte starts a new header block.
    fn reset(&mut self) {
        self.state = State::ScanningHeaders;
        self.line.clear();
        self.header_block.clear();
        self.headers = FrameHeaders::default();
        self.body.clear();
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::ScanningHeaders => "ScanningHeaders",
            State::ReadingBody { .. } => "ReadingBody",
        }
    }
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::new()
    }
}
