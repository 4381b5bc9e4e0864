//! Connection builder and lifecycle.
//!
//! [`ConnectionBuilder`] provides a fluent API for wiring the codec, the
//! downstream handler, the output charset, and the listeners, then starting
//! the transport over a pair of raw streams. [`Connection`] is the running
//! assembly: reader task, dispatcher, and writer handle.
//!
//! # Example
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
//!         .on_incoming(|_, raw| tracing::debug!("<- {}", raw))
//!         .start(tokio::io::stdin(), tokio::io::stdout());
//!
//!     connection.wait_for_shutdown().await;
//! }
//! ```

use std::sync::Arc;

use encoding_rs::Encoding;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::codec::{JsonCodec, MessageCodec};
use crate::dispatch::{Dispatcher, MessageHandler};
use crate::error::WireError;
use crate::listener::Listeners;
use crate::message::Message;
use crate::reader::FrameReader;
use crate::writer::{FrameWriter, WriterConfig};

/// Builder for configuring and starting a [`Connection`].
pub struct ConnectionBuilder {
    codec: Option<Arc<dyn MessageCodec>>,
    handler: Option<Arc<dyn MessageHandler>>,
    writer_config: WriterConfig,
    listeners: Listeners,
}

impl ConnectionBuilder {
    /// Create a new builder with the default JSON codec and UTF-8 output.
    pub fn new() -> Self {
        Self {
            codec: None,
            handler: None,
            writer_config: WriterConfig::default(),
            listeners: Listeners::new(),
        }
    }

    /// Replace the default [`JsonCodec`].
    pub fn codec(mut self, codec: impl MessageCodec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Set the downstream handler (required).
    pub fn handler(mut self, handler: impl MessageHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Set the charset for outgoing frame bodies.
    ///
    /// Default: UTF-8. Content-Type is emitted on the wire only for other
    /// charsets.
    pub fn output_charset(mut self, charset: &'static Encoding) -> Self {
        self.writer_config.charset = charset;
        self
    }

    /// Register an error listener `(context, cause)`.
    pub fn on_error(mut self, listener: impl Fn(&str, &WireError) + Send + Sync + 'static) -> Self {
        self.listeners.on_error(listener);
        self
    }

    /// Register an incoming-message listener `(message, raw_text)`.
    pub fn on_incoming(
        mut self,
        listener: impl Fn(&Message, &str) + Send + Sync + 'static,
    ) -> Self {
        self.listeners.on_incoming(listener);
        self
    }

    /// Register an outgoing-message listener `(message, raw_text)`.
    pub fn on_outgoing(
        mut self,
        listener: impl Fn(&Message, &str) + Send + Sync + 'static,
    ) -> Self {
        self.listeners.on_outgoing(listener);
        self
    }

    /// Wire the components over the stream pair and start the reader task.
    ///
    /// # Panics
    ///
    /// Panics if no handler was configured.
    pub fn start<R, W>(self, input: R, output: W) -> Connection
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let handler = self
            .handler
            .expect("a message handler is required to start a connection");
        let codec = self.codec.unwrap_or_else(|| Arc::new(JsonCodec));
        let listeners = Arc::new(self.listeners);

        let writer = FrameWriter::new(
            output,
            codec.clone(),
            self.writer_config,
            listeners.clone(),
        );
        let dispatcher = Dispatcher::new(codec, handler, writer.clone(), listeners.clone());
        let mut reader = FrameReader::new(input, dispatcher, listeners);
        reader.start();

        Connection { writer, reader }
    }
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running transport: one reader task plus a shared writer.
pub struct Connection {
    writer: FrameWriter,
    reader: FrameReader,
}

impl Connection {
    /// Create a new connection builder.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// A writer handle for sending messages from any task.
    pub fn writer(&self) -> FrameWriter {
        self.writer.clone()
    }

    /// Request cooperative shutdown of the reader task.
    pub fn stop(&self) {
        self.reader.stop();
    }

    /// Block until the reader task exits (stream end or stop request).
    pub async fn wait_for_shutdown(mut self) {
        self.reader.join().await;
    }
}
