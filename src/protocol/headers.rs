//! Header block parsing and building.
//!
//! Each frame starts with MIME-style `Key: value` lines, CRLF terminated,
//! closed by a blank line. Exactly two keys are recognized, case-sensitively:
//!
//! - `Content-Length` (mandatory): decimal byte count of the body.
//! - `Content-Type` (optional): scanned for a `charset=` fragment that
//!   overrides the body charset for that frame only.

use encoding_rs::{Encoding, UTF_8};

/// Mandatory header carrying the body byte count.
pub const CONTENT_LENGTH_HEADER: &str = "Content-Length";

/// Optional header carrying the body MIME type and charset.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// MIME type emitted in outgoing Content-Type headers.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Line terminator for header lines and the blank line ending the block.
pub const CRLF: &str = "\r\n";

/// Parsed headers for one in-flight frame.
///
/// A fresh instance is used per frame; the scanner resets it after every
/// completed or dropped frame.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameHeaders {
    /// Body byte count. `None` until a valid Content-Length line is seen.
    pub content_length: Option<usize>,
    /// Charset override from Content-Type. `None` means the default (UTF-8).
    pub charset: Option<String>,
}

impl FrameHeaders {
    /// Feed one complete header line (without its terminator).
    ///
    /// Unknown keys are ignored. A Content-Length value that does not parse
    /// as a decimal integer is logged and ignored, leaving the length unset.
    pub fn parse_line(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(':') else {
            return;
        };
        let value = value.trim();

        match key.trim() {
            CONTENT_LENGTH_HEADER => match value.parse::<usize>() {
                Ok(length) => self.content_length = Some(length),
                Err(_) => {
                    tracing::warn!("ignoring invalid Content-Length value: {:?}", value);
                }
            },
            CONTENT_TYPE_HEADER => {
                if let Some(charset) = charset_fragment(value) {
                    self.charset = Some(charset.to_string());
                }
            }
            _ => {}
        }
    }

    /// The charset label in effect for this frame.
    pub fn charset_label(&self) -> &str {
        self.charset.as_deref().unwrap_or("utf-8")
    }
}

/// Extract the value of a `charset=` fragment from a Content-Type value.
fn charset_fragment(value: &str) -> Option<&str> {
    value.split(';').find_map(|segment| {
        segment
            .trim()
            .strip_prefix("charset=")
            .map(|v| v.trim_matches('"'))
    })
}

/// Build the header block for an outgoing frame body of `content_length`
/// bytes.
///
/// Content-Type is emitted only when the output charset differs from UTF-8.
pub fn build_header_block(content_length: usize, charset: &'static Encoding) -> String {
    let mut block = format!("{}: {}{}", CONTENT_LENGTH_HEADER, content_length, CRLF);
    if charset != UTF_8 {
        block.push_str(&format!(
            "{}: {}; charset={}{}",
            CONTENT_TYPE_HEADER,
            JSON_MIME_TYPE,
            charset.name().to_ascii_lowercase(),
            CRLF
        ));
    }
    block.push_str(CRLF);
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn test_parse_content_length() {
        let mut headers = FrameHeaders::default();
        headers.parse_line("Content-Length: 123");
        assert_eq!(headers.content_length, Some(123));
    }

    #[test]
    fn test_invalid_content_length_is_ignored() {
        let mut headers = FrameHeaders::default();
        headers.parse_line("Content-Length: abc");
        assert_eq!(headers.content_length, None);
    }

    #[test]
    fn test_key_match_is_case_sensitive() {
        let mut headers = FrameHeaders::default();
        headers.parse_line("content-length: 10");
        assert_eq!(headers.content_length, None);
    }

    #[test]
    fn test_content_type_charset_fragment() {
        let mut headers = FrameHeaders::default();
        headers.parse_line("Content-Type: application/json; charset=iso-8859-1");
        assert_eq!(headers.charset.as_deref(), Some("iso-8859-1"));
        assert_eq!(headers.charset_label(), "iso-8859-1");
    }

    #[test]
    fn test_content_type_without_charset() {
        let mut headers = FrameHeaders::default();
        headers.parse_line("Content-Type: application/json");
        assert_eq!(headers.charset, None);
        assert_eq!(headers.charset_label(), "utf-8");
    }

    #[test]
    fn test_quoted_charset_value() {
        let mut headers = FrameHeaders::default();
        headers.parse_line(r#"Content-Type: application/json; charset="utf-8""#);
        assert_eq!(headers.charset.as_deref(), Some("utf-8"));
    }

    #[test]
    fn test_unknown_header_ignored() {
        let mut headers = FrameHeaders::default();
        headers.parse_line("X-Custom: something");
        assert_eq!(headers, FrameHeaders::default());
    }

    #[test]
    fn test_line_without_colon_ignored() {
        let mut headers = FrameHeaders::default();
        headers.parse_line("garbage");
        assert_eq!(headers, FrameHeaders::default());
    }

    #[test]
    fn test_build_header_block_utf8() {
        let block = build_header_block(42, UTF_8);
        assert_eq!(block, "Content-Length: 42\r\n\r\n");
    }

    #[test]
    fn test_build_header_block_other_charset() {
        let block = build_header_block(7, WINDOWS_1252);
        assert_eq!(
            block,
            "Content-Length: 7\r\nContent-Type: application/json; charset=windows-1252\r\n\r\n"
        );
    }
}
