//! Frame writer for concurrency-safe outgoing frames.
//!
//! [`FrameWriter`] is a cheaply cloneable handle callable from any task: the
//! dispatcher's error path, the downstream handler, or the owning
//! application. Each send serializes the message, builds the header block,
//! and writes header + body + flush under one mutex guard, so two concurrent
//! sends can never interleave their bytes on the shared output.
//!
//! Write failures are reported to the error listeners and swallowed; they
//! never propagate to the caller. Outgoing listeners are notified only after
//! a successful flush.

use std::sync::Arc;

use encoding_rs::{Encoding, UTF_8};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::codec::MessageCodec;
use crate::error::WireError;
use crate::listener::Listeners;
use crate::message::Message;
use crate::protocol::build_header_block;

/// Output writer type erased behind the mutex.
type BoxedOutput = Box<dyn AsyncWrite + Send + Unpin>;

/// Configuration for the frame writer.
#[derive(Debug, Clone, Copy)]
pub struct WriterConfig {
    /// Charset used to encode outgoing bodies. Content-Type is emitted on
    /// the wire only when this differs from UTF-8.
    pub charset: &'static Encoding,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { charset: UTF_8 }
    }
}

/// Handle for sending framed messages on the shared output.
#[derive(Clone)]
pub struct FrameWriter {
    inner: Arc<Inner>,
}

struct Inner {
    output: Mutex<BoxedOutput>,
    codec: Arc<dyn MessageCodec>,
    config: WriterConfig,
    listeners: Arc<Listeners>,
}

impl FrameWriter {
    /// Create a new frame writer owning the output stream.
    pub fn new<W>(
        output: W,
        codec: Arc<dyn MessageCodec>,
        config: WriterConfig,
        listeners: Arc<Listeners>,
    ) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                output: Mutex::new(Box::new(output)),
                codec,
                config,
                listeners,
            }),
        }
    }

    /// Serialize and send one message as a complete frame.
    ///
    /// Stamps the protocol version when the message lacks one. Safe to call
    /// concurrently from any task; frames never interleave. Failures are
    /// reported through the error listeners, never returned.
    pub async fn send(&self, mut message: Message) {
        message.ensure_version();

        let text = match self.inner.codec.serialize(&message) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("failed to serialize outgoing message: {}", e);
                self.inner
                    .listeners
                    .notify_error("failed to serialize outgoing message", &e);
                return;
            }
        };

        let (body, _, _) = self.inner.config.charset.encode(&text);
        let header = build_header_block(body.len(), self.inner.config.charset);

        let result = {
            let mut output = self.inner.output.lock().await;
            write_frame(&mut output, header.as_bytes(), &body).await
        };

        match result {
            Ok(()) => self.inner.listeners.notify_outgoing(&message, &text),
            Err(e) => {
                tracing::error!("failed to write frame: {}", e);
                self.inner
                    .listeners
                    .notify_error("failed to write frame", &WireError::Io(e));
            }
        }
    }
}

/// Write header bytes, then body bytes, then flush.
///
/// Caller must hold the output lock for the whole call.
async fn write_frame(
    output: &mut BoxedOutput,
    header: &[u8],
    body: &[u8],
) -> std::io::Result<()> {
    output.write_all(header).await?;
    output.write_all(body).await?;
    output.flush().await
}
