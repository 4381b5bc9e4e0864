//! Frame reader - the background read loop.
//!
//! One task owns the input stream. It performs bounded reads, feeds the
//! bytes to the [`FrameScanner`](crate::protocol::FrameScanner), and hands
//! each complete frame to the [`Dispatcher`](crate::dispatch::Dispatcher).
//!
//! Lifecycle:
//! - `start()` spawns the task; starting twice is a programming error and
//!   panics.
//! - `stop()` requests cooperative shutdown via a cancellation token. It is
//!   idempotent, callable from anywhere, and only guarantees that the next
//!   loop check exits - a read blocked in `select!` is unblocked by the
//!   token.
//! - End of stream and closed-channel errors end the loop cleanly with no
//!   error reported. Interrupted reads are swallowed and the loop continues.

use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::dispatch::Dispatcher;
use crate::error::WireError;
use crate::listener::Listeners;
use crate::protocol::{FrameScanner, ScanEvent};

/// Read buffer size for the loop (64 KiB).
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Input reader type erased for the spawned task.
type BoxedInput = Box<dyn AsyncRead + Send + Unpin>;

/// Owns the background task that scans frames off the input stream.
pub struct FrameReader {
    input: Option<BoxedInput>,
    dispatcher: Dispatcher,
    listeners: Arc<Listeners>,
    shutdown: CancellationToken,
    started: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl FrameReader {
    /// Create a reader over the input stream. The loop does not run until
    /// [`start`](Self::start) is called.
    pub fn new<R>(input: R, dispatcher: Dispatcher, listeners: Arc<Listeners>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            input: Some(Box::new(input)),
            dispatcher,
            listeners,
            shutdown: CancellationToken::new(),
            started: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Spawn the read loop.
    ///
    /// # Panics
    ///
    /// Panics if the reader was already started. A reader drives exactly one
    /// loop over its input; it cannot be restarted after `stop()`.
    pub fn start(&mut self) {
        if self.started.swap(true, Ordering::SeqCst) {
            panic!("frame reader already started");
        }
        let input = self
            .input
            .take()
            .expect("input present on first start");

        let dispatcher = self.dispatcher.clone();
        let listeners = self.listeners.clone();
        let shutdown = self.shutdown.clone();

        self.task = Some(tokio::spawn(read_loop(
            input, dispatcher, listeners, shutdown,
        )));
    }

    /// Request cooperative shutdown. Idempotent; callable from any task.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Whether `start()` has been called.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Wait for the read loop to exit. Resolves immediately if the loop was
    /// never started or has already finished.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// The read loop: bounded reads, scanned into frames, dispatched in order.
async fn read_loop(
    mut input: BoxedInput,
    dispatcher: Dispatcher,
    listeners: Arc<Listeners>,
    shutdown: CancellationToken,
) {
    let mut scanner = FrameScanner::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let n = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = input.read(&mut buf) => match result {
                // End of stream: exit cleanly, no error reported.
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_channel_closed(e.kind()) => break,
                Err(e) => {
                    tracing::error!("read loop I/O error: {}", e);
                    listeners.notify_error("read loop failed", &WireError::Io(e));
                    break;
                }
            },
        };

        for event in scanner.push(&buf[..n]) {
            match event {
                ScanEvent::Text(text) => dispatcher.dispatch(&text).await,
                ScanEvent::Dropped(e) => {
                    tracing::warn!("dropping frame: {}", e);
                    listeners.notify_error("frame dropped", &e);
                }
            }
        }
    }
}

/// Stream-closed conditions that end the loop without an error report.
fn is_channel_closed(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::UnexpectedEof
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{JsonCodec, MessageCodec};
    use crate::message::Message;
    use crate::writer::{FrameWriter, WriterConfig};
    use std::sync::Mutex as StdMutex;
    use tokio::io::{duplex, AsyncWriteExt};
    use tokio::time::{timeout, Duration};

    fn reader_with_sink(
        input: impl AsyncRead + Send + Unpin + 'static,
    ) -> (FrameReader, Arc<StdMutex<Vec<Message>>>) {
        let (writer_side, _sink) = duplex(4096);
        let listeners = Arc::new(Listeners::new());
        let codec: Arc<dyn MessageCodec> = Arc::new(JsonCodec);
        let writer = FrameWriter::new(
            writer_side,
            codec.clone(),
            WriterConfig::default(),
            listeners.clone(),
        );

        let received = Arc::new(StdMutex::new(Vec::new()));
        let received_clone = received.clone();
        let handler = move |message: Message| {
            received_clone.lock().unwrap().push(message);
            Ok::<(), WireError>(())
        };
        let dispatcher = Dispatcher::new(codec, Arc::new(handler), writer, listeners.clone());

        (FrameReader::new(input, dispatcher, listeners), received)
    }

    #[tokio::test]
    async fn test_reads_and_dispatches_frames() {
        let (mut input, reader_side) = duplex(4096);
        let (mut reader, received) = reader_with_sink(reader_side);
        reader.start();

        let body = r#"{"jsonrpc":"2.0","id":"1","method":"ping"}"#;
        input
            .write_all(format!("Content-Length: {}\r\n\r\n{}", body.len(), body).as_bytes())
            .await
            .unwrap();
        drop(input);

        timeout(Duration::from_secs(5), reader.join()).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert!(matches!(received[0], Message::Request(_)));
    }

    #[tokio::test]
    async fn test_eof_ends_loop_cleanly() {
        let (input, reader_side) = duplex(64);
        let (mut reader, received) = reader_with_sink(reader_side);
        reader.start();

        drop(input);
        timeout(Duration::from_secs(5), reader.join()).await.unwrap();
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_body_at_eof_is_not_dispatched() {
        let (mut input, reader_side) = duplex(4096);
        let (mut reader, received) = reader_with_sink(reader_side);
        reader.start();

        input
            .write_all(b"Content-Length: 100\r\n\r\nonly a few bytes")
            .await
            .unwrap();
        drop(input);

        timeout(Duration::from_secs(5), reader.join()).await.unwrap();
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stop_unblocks_pending_read() {
        let (_input, reader_side) = duplex(64);
        let (mut reader, _received) = reader_with_sink(reader_side);
        reader.start();

        // The loop is blocked on a read with no data coming.
        reader.stop();
        timeout(Duration::from_secs(5), reader.join()).await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (_input, reader_side) = duplex(64);
        let (mut reader, _received) = reader_with_sink(reader_side);
        reader.start();

        reader.stop();
        reader.stop();
        timeout(Duration::from_secs(5), reader.join()).await.unwrap();
    }

    #[tokio::test]
    #[should_panic(expected = "frame reader already started")]
    async fn test_double_start_panics() {
        let (_input, reader_side) = duplex(64);
        let (mut reader, _received) = reader_with_sink(reader_side);
        reader.start();
        reader.start();
    }

    #[tokio::test]
    async fn test_join_without_start_resolves() {
        let (_input, reader_side) = duplex(64);
        let (mut reader, _received) = reader_with_sink(reader_side);
        assert!(!reader.is_started());
        reader.join().await;
    }
}
