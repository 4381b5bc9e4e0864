//! Protocol module - wire format and framing.
//!
//! This module implements the header-delimited text framing:
//! - MIME-style header block parsing and building
//! - Frame scanner for accumulating partial reads

mod headers;
mod scanner;

pub use headers::{
    build_header_block, FrameHeaders, CONTENT_LENGTH_HEADER, CONTENT_TYPE_HEADER, CRLF,
    JSON_MIME_TYPE,
};
pub use scanner::{FrameScanner, ScanEvent};
