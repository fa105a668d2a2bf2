//! Fan-out of one reader into independent copies.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::StreamResult;
use crate::reader::StreamReader;

struct Shared<T> {
    source: tokio::sync::Mutex<StreamReader<T>>,
    // One queue per copy; `None` once that copy is dropped.
    buffers: Mutex<Vec<Option<VecDeque<StreamResult<T>>>>>,
}

impl<T: Clone> Shared<T> {
    fn pop(&self, index: usize) -> Option<StreamResult<T>> {
        self.buffers
            .lock()
            .get_mut(index)
            .and_then(Option::as_mut)
            .and_then(VecDeque::pop_front)
    }

    fn fan_out(&self, from: usize, item: &StreamResult<T>) {
        let mut buffers = self.buffers.lock();
        for (index, buffer) in buffers.iter_mut().enumerate() {
            if index == from {
                continue;
            }
            if let Some(queue) = buffer.as_mut() {
                queue.push_back(item.clone());
            }
        }
    }
}

struct CopyHandle<T> {
    shared: Arc<Shared<T>>,
    index: usize,
}

impl<T: Clone> CopyHandle<T> {
    async fn next(&self) -> Option<StreamResult<T>> {
        if let Some(item) = self.shared.pop(self.index) {
            return Some(item);
        }
        let mut source = self.shared.source.lock().await;
        // Another copy may have pulled while we waited for the lock.
        if let Some(item) = self.shared.pop(self.index) {
            return Some(item);
        }
        let item = source.recv().await.transpose()?;
        self.shared.fan_out(self.index, &item);
        Some(item)
    }
}

impl<T> Drop for CopyHandle<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.shared.buffers.lock().get_mut(self.index) {
            if let Some(queue) = slot.take() {
                trace!(copy = self.index, discarded = queue.len(), "copy dropped");
            }
        }
    }
}

impl<T: Clone + Send + 'static> StreamReader<T> {
    /// Split the reader into `n` readers that each see every chunk in order.
    ///
    /// Every copy buffers independently, so a slow copy never stalls the
    /// others. The source is read only when some copy asks for a chunk it
    /// has not buffered yet. Dropping a copy discards its buffer.
    ///
    /// `n < 2` returns the reader itself.
    pub fn copy(self, n: usize) -> Vec<StreamReader<T>> {
        if n < 2 {
            return vec![self];
        }
        debug!(copies = n, "copying stream");
        let shared = Arc::new(Shared {
            source: tokio::sync::Mutex::new(self),
            buffers: Mutex::new((0..n).map(|_| Some(VecDeque::new())).collect()),
        });
        (0..n)
            .map(|index| {
                let handle = CopyHandle {
                    shared: Arc::clone(&shared),
                    index,
                };
                StreamReader::from_stream(futures::stream::unfold(handle, |handle| async move {
                    let item = handle.next().await?;
                    Some((item, handle))
                }))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use crate::pipe::pipe;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_each_copy_sees_every_chunk() {
        let (reader, mut writer) = pipe(2);
        tokio::spawn(async move {
            for i in 0..5 {
                writer.send(i).await;
            }
        });

        let mut copies = reader.copy(2);
        let second = copies.pop().unwrap();
        let first = copies.pop().unwrap();
        let (a, b) = tokio::join!(first.drain(), second.drain());
        assert_eq!(a.unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(b.unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_slow_copy_does_not_block_fast_copy() {
        let (reader, mut writer) = pipe(1);
        let producer = tokio::spawn(async move {
            for i in 0..10 {
                writer.send(i).await;
            }
        });

        let mut copies = reader.copy(2);
        let slow = copies.pop().unwrap();
        let fast = copies.pop().unwrap();

        assert_eq!(fast.drain().await.unwrap(), (0..10).collect::<Vec<_>>());
        producer.await.unwrap();
        assert_eq!(slow.drain().await.unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_error_reaches_every_copy() {
        let (reader, mut writer) = pipe(4);
        writer.send("a").await;
        writer.send_error(StreamError::Other("upstream".into())).await;

        for mut copy in reader.copy(3) {
            assert_eq!(copy.recv().await.unwrap(), Some("a"));
            assert_eq!(copy.recv().await.unwrap_err().to_string(), "upstream");
            assert_eq!(copy.recv().await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_dropped_copy_releases_buffer() {
        let reader = StreamReader::from_vec(vec![1, 2, 3]);
        let mut copies = reader.copy(2);
        let dropped = copies.pop().unwrap();
        let mut kept = copies.pop().unwrap();

        assert_eq!(kept.recv().await.unwrap(), Some(1));
        drop(dropped);
        assert_eq!(kept.drain().await.unwrap(), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_copy_of_one_is_identity() {
        let copies = StreamReader::from_vec(vec![9]).copy(1);
        assert_eq!(copies.len(), 1);
    }
}
