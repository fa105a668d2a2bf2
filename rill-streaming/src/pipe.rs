//! Bounded single-producer pipes.

use rill_core::settings::StreamSettings;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{StreamError, StreamResult};
use crate::reader::StreamReader;

/// Create a pipe with the given queue capacity.
///
/// `send` suspends while `capacity` chunks are queued; zero is treated as one.
pub fn pipe<T>(capacity: usize) -> (StreamReader<T>, StreamWriter<T>) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    debug!(capacity, "pipe created");
    (StreamReader::from_receiver(rx), StreamWriter { tx: Some(tx) })
}

/// Create a pipe sized by [`StreamSettings`].
pub fn pipe_with_config<T>(config: &StreamSettings) -> (StreamReader<T>, StreamWriter<T>) {
    pipe(config.effective_capacity())
}

/// The producing half of a pipe.
///
/// Dropping the writer closes the stream.
#[derive(Debug)]
pub struct StreamWriter<T> {
    tx: Option<mpsc::Sender<StreamResult<T>>>,
}

impl<T> StreamWriter<T> {
    /// Send a chunk, waiting while the queue is full.
    ///
    /// Returns `true` when the stream is closed and the producer should stop.
    pub async fn send(&mut self, value: T) -> bool {
        let Some(tx) = &self.tx else {
            return true;
        };
        if tx.send(Ok(value)).await.is_err() {
            trace!("reader dropped, stopping writer");
            self.tx = None;
            return true;
        }
        false
    }

    /// Blocking variant of [`send`](Self::send) for producers on plain threads.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async runtime.
    pub fn blocking_send(&mut self, value: T) -> bool {
        let Some(tx) = &self.tx else {
            return true;
        };
        if tx.blocking_send(Ok(value)).is_err() {
            trace!("reader dropped, stopping writer");
            self.tx = None;
            return true;
        }
        false
    }

    /// Deliver a terminal error and close the stream.
    ///
    /// Returns `true` when the error could not be delivered.
    pub async fn send_error(&mut self, err: StreamError) -> bool {
        let Some(tx) = self.tx.take() else {
            return true;
        };
        debug!(error = %err, "producer error");
        tx.send(Err(err)).await.is_err()
    }

    /// Close the stream. Later sends are no-ops.
    pub fn close(&mut self) {
        if self.tx.take().is_some() {
            trace!("writer closed");
        }
    }

    /// Check if the stream is closed from either side.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().map_or(true, mpsc::Sender::is_closed)
    }
}
