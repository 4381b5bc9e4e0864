//! Error types for lspwire.

use thiserror::Error;

use crate::message::MessageId;

/// Main error type for all transport operations.
#[derive(Debug, Error)]
pub enum WireError {
    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A header block ended without a Content-Length header.
    ///
    /// Carries the accumulated header block for diagnostics.
    #[error("missing Content-Length header in: {0:?}")]
    MissingContentLength(String),

    /// Body bytes could not be decoded under the frame's charset.
    #[error("unsupported or invalid charset: {0}")]
    UnsupportedCharset(String),

    /// The codec rejected the frame text.
    ///
    /// `id` is the request id recovered from the malformed body, when the
    /// body was structurally valid JSON with an `id` member.
    #[error("message parse error: {reason}")]
    Parse {
        reason: String,
        id: Option<MessageId>,
    },

    /// The downstream handler failed while processing a parsed message.
    #[error("handler error: {0}")]
    Handler(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using WireError.
pub type Result<T> = std::result::Result<T, WireError>;
