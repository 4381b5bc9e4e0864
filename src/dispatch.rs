//! Dispatcher - the protocol core between framing and the application.
//!
//! Each decoded frame body is parsed through the codec, announced to the
//! incoming listeners, and forwarded to the downstream handler. Every
//! failure is contained here: it is logged through the error listeners and
//! answered with a synthesized JSON-RPC error response carrying the request
//! id when one was extracted before the failure. Nothing unwinds out of the
//! reader task.

use std::sync::Arc;

use crate::codec::MessageCodec;
use crate::error::{Result, WireError};
use crate::listener::Listeners;
use crate::message::{error_codes, Message, MessageId};
use crate::writer::FrameWriter;

/// Downstream application handler receiving every successfully parsed
/// message.
///
/// A returned error is contained by the dispatcher and answered with an
/// internal-error response; it never crashes the reader task.
pub trait MessageHandler: Send + Sync {
    fn accept(&self, message: Message) -> Result<()>;
}

impl<F> MessageHandler for F
where
    F: Fn(Message) -> Result<()> + Send + Sync,
{
    fn accept(&self, message: Message) -> Result<()> {
        self(message)
    }
}

/// Routes parsed messages to the handler and synthesizes error replies.
#[derive(Clone)]
pub struct Dispatcher {
    codec: Arc<dyn MessageCodec>,
    handler: Arc<dyn MessageHandler>,
    writer: FrameWriter,
    listeners: Arc<Listeners>,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(
        codec: Arc<dyn MessageCodec>,
        handler: Arc<dyn MessageHandler>,
        writer: FrameWriter,
        listeners: Arc<Listeners>,
    ) -> Self {
        Self {
            codec,
            handler,
            writer,
            listeners,
        }
    }

    /// Parse one frame body and route the result.
    ///
    /// A codec rejection is answered with a parse-error response, echoing
    /// the id recovered from the malformed body when there was one.
    pub async fn dispatch(&self, text: &str) {
        match self.codec.parse(text) {
            Ok(message) => self.consume(message, text).await,
            Err(e) => {
                let id = match &e {
                    WireError::Parse { id, .. } => id.clone(),
                    _ => None,
                };
                tracing::warn!("failed to parse frame: {}", e);
                self.listeners.notify_error("failed to parse frame", &e);
                self.reply_error(id, error_codes::PARSE_ERROR, e.to_string())
                    .await;
            }
        }
    }

    /// Route an already-parsed message.
    ///
    /// The request id is captured before the handler runs so a handler
    /// failure can be answered with the right id; notifications get no
    /// reply.
    pub async fn consume(&self, message: Message, raw_text: &str) {
        let request_id = match &message {
            Message::Request(request) => Some(request.id.clone()),
            _ => None,
        };

        self.listeners.notify_incoming(&message, raw_text);

        if let Err(e) = self.handler.accept(message) {
            tracing::error!("handler failed: {}", e);
            self.listeners.notify_error("handler failed", &e);
            self.reply_error(request_id, error_codes::INTERNAL_ERROR, e.to_string())
                .await;
        }
    }

    async fn reply_error(&self, id: Option<MessageId>, code: i64, reason: String) {
        self.writer
            .send(Message::error_response(id, code, reason))
            .await;
    }
}
