//! Codec module - conversion between frame text and message objects.
//!
//! The transport never interprets JSON itself; it hands each decoded frame
//! body to a [`MessageCodec`] and sends outgoing messages through the same
//! codec. [`JsonCodec`] is the default, built on `serde_json`.
//!
//! # Example
//!
//! ```
//! use lspwire::codec::{JsonCodec, MessageCodec};
//!
//! let codec = JsonCodec;
//! let message = codec
//!     .parse(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
//!     .unwrap();
//! let text = codec.serialize(&message).unwrap();
//! assert!(text.contains("\"ping\""));
//! ```

mod json;

pub use json::JsonCodec;

use crate::error::Result;
use crate::message::Message;

/// Converts between raw frame text and typed messages.
///
/// `parse` must fail with [`WireError::Parse`](crate::error::WireError::Parse)
/// on malformed input, recovering the message id when the body allows it so
/// the dispatcher can echo it into an error reply.
pub trait MessageCodec: Send + Sync {
    /// Parse one frame body into a message.
    fn parse(&self, text: &str) -> Result<Message>;

    /// Serialize one message into a frame body.
    fn serialize(&self, message: &Message) -> Result<String>;
}
