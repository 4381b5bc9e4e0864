//! # lspwire
//!
//! Content-Length framed JSON-RPC transport over a raw duplex byte stream,
//! in the style used by language servers (typically process stdio).
//!
//! ## Architecture
//!
//! - **Frame Reader**: one background task scans the input stream with a
//!   header/body state machine and decodes each frame body to text.
//! - **Dispatcher**: parses frame text through a pluggable codec, forwards
//!   messages to the downstream handler, and synthesizes JSON-RPC error
//!   responses for contained failures.
//! - **Frame Writer**: serializes outgoing messages and writes each frame
//!   atomically under a lock - safe to call from any task.
//! - **Listeners**: ordered error/incoming/outgoing callbacks for logging
//!   and telemetry.
//!
//! ## Example
//!
//! ```ignore
//! use lspwire::{Connection, Message};
//!
//! #[tokio::main]
//! async fn main() {
//!     let connection = Connection::builder()
//!         .handler(|message: Message| {
//!             // application-level processing
//!             Ok(())
//!         })
//!         .start(tokio::io::stdin(), tokio::io::stdout());
//!
//!     connection.wait_for_shutdown().await;
//! }
//! ```

pub mod codec;
pub mod error;
pub mod listener;
pub mod message;
pub mod protocol;

mod connection;
mod dispatch;
mod reader;
mod writer;

pub use connection::{Connection, ConnectionBuilder};
pub use dispatch::{Dispatcher, MessageHandler};
pub use error::WireError;
pub use message::Message;
pub use reader::FrameReader;
pub use writer::{FrameWriter, WriterConfig};
