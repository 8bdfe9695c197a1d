// src/runner/reader.rs

//! Background line readers for the child's output pipes.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::protocol::clean_line;

/// Spawn a task that reads `stream` line by line until end-of-stream and
/// pushes each cleaned line onto the returned queue.
///
/// The queue's sender is dropped when the stream closes, so the receiver
/// reports `Disconnected` once every line has been taken.
pub fn spawn_line_reader<R>(stream: R, stream_name: &'static str) -> mpsc::UnboundedReceiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(clean_line(&buf)).is_err() {
                        debug!(stream = stream_name, "line queue dropped; stopping reader");
                        break;
                    }
                }
                Err(e) => {
                    warn!(stream = stream_name, error = %e, "error reading child output");
                    break;
                }
            }
        }

        debug!(stream = stream_name, "reader reached end of stream");
    });

    rx
}
