//! The consuming half of a stream.

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use rill_core::concat::{concat_slice, Concat};
use std::fmt;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{StreamError, StreamResult};

enum Source<T> {
    Pipe(mpsc::Receiver<StreamResult<T>>),
    Array(std::vec::IntoIter<T>),
    Stream(BoxStream<'static, StreamResult<T>>),
}

/// An ordered sequence of chunks, each read exactly once.
///
/// After end or a terminal error every further read reports end.
/// Dropping the reader closes the stream, so a blocked producer wakes up
/// and sees `closed = true`.
pub struct StreamReader<T> {
    source: Source<T>,
    done: bool,
}

impl<T> StreamReader<T> {
    pub(crate) fn from_receiver(rx: mpsc::Receiver<StreamResult<T>>) -> Self {
        Self {
            source: Source::Pipe(rx),
            done: false,
        }
    }

    /// A reader over an in-memory sequence.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            source: Source::Array(items.into_iter()),
            done: false,
        }
    }

    /// A reader over any stream of results.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = StreamResult<T>> + Send + 'static,
    {
        Self {
            source: Source::Stream(stream.boxed()),
            done: false,
        }
    }

    /// Receive the next chunk.
    ///
    /// `Ok(None)` marks the end of the stream.
    pub async fn recv(&mut self) -> StreamResult<Option<T>> {
        self.next().await.transpose()
    }

    /// Check if the reader has reported end.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn finish(&mut self) {
        self.done = true;
        // Release the source now so producers and sibling streams stop.
        self.source = Source::Array(Vec::new().into_iter());
    }

    /// Read every remaining chunk.
    ///
    /// Returns the terminal error instead if the stream fails.
    pub async fn drain(mut self) -> StreamResult<Vec<T>> {
        let mut out = Vec::new();
        while let Some(chunk) = self.recv().await? {
            out.push(chunk);
        }
        trace!(chunks = out.len(), "stream drained");
        Ok(out)
    }

    /// Read every remaining chunk and reduce them to one value.
    pub async fn concat(self) -> StreamResult<T>
    where
        T: Concat,
    {
        let chunks = self.drain().await?;
        Ok(concat_slice(&chunks)?)
    }
}

impl<T: Send + 'static> StreamReader<T> {
    /// Map each chunk lazily.
    ///
    /// `f` returning [`StreamError::NoValue`] skips the chunk; any other error
    /// is delivered as the terminal error.
    pub fn convert<U, F>(self, f: F) -> StreamReader<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> StreamResult<U> + Send + 'static,
    {
        self.convert_with(f, |err| err)
    }

    /// Like [`convert`](Self::convert), also mapping upstream errors.
    ///
    /// `on_error` returning [`StreamError::NoValue`] drops the error and
    /// reading continues.
    pub fn convert_with<U, F, E>(self, f: F, on_error: E) -> StreamReader<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> StreamResult<U> + Send + 'static,
        E: FnMut(StreamError) -> StreamError + Send + 'static,
    {
        StreamReader::from_stream(Convert {
            inner: self,
            f,
            on_error,
        })
    }
}

// Sources are never pinned structurally.
impl<T> Unpin for StreamReader<T> {}

impl<T> Stream for StreamReader<T> {
    type Item = StreamResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        let item = match &mut this.source {
            Source::Pipe(rx) => ready!(rx.poll_recv(cx)),
            Source::Array(items) => items.next().map(Ok),
            Source::Stream(stream) => ready!(stream.poll_next_unpin(cx)),
        };
        match item {
            Some(Ok(chunk)) => Poll::Ready(Some(Ok(chunk))),
            Some(Err(err)) => {
                this.finish();
                Poll::Ready(Some(Err(err)))
            }
            None => {
                this.finish();
                Poll::Ready(None)
            }
        }
    }
}

impl<T> fmt::Debug for StreamReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            Source::Pipe(_) => "pipe",
            Source::Array(_) => "array",
            Source::Stream(_) => "stream",
        };
        f.debug_struct("StreamReader")
            .field("source", &source)
            .field("done", &self.done)
            .finish()
    }
}

pin_project! {
    struct Convert<T, F, E> {
        #[pin]
        inner: StreamReader<T>,
        f: F,
        on_error: E,
    }
}

impl<T, U, F, E> Stream for Convert<T, F, E>
where
    F: FnMut(T) -> StreamResult<U>,
    E: FnMut(StreamError) -> StreamError,
{
    type Item = StreamResult<U>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            let mapped = match ready!(this.inner.as_mut().poll_next(cx)) {
                None => return Poll::Ready(None),
                Some(Ok(chunk)) => (this.f)(chunk),
                Some(Err(err)) => Err((this.on_error)(err)),
            };
            match mapped {
                Err(StreamError::NoValue) => continue,
                other => return Poll::Ready(Some(other)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::pipe;
    use pretty_assertions::assert_eq;
    use rill_core::messages::Message;

    #[tokio::test]
    async fn test_from_vec() {
        let mut reader = StreamReader::from_vec(vec![1, 2]);
        assert_eq!(reader.recv().await.unwrap(), Some(1));
        assert_eq!(reader.recv().await.unwrap(), Some(2));
        assert_eq!(reader.recv().await.unwrap(), None);
        assert!(reader.is_done());
        assert_eq!(reader.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_is_a_stream() {
        let reader = StreamReader::from_vec(vec!["a", "b"]);
        let items: Vec<_> = reader.map(|r| r.unwrap()).collect().await;
        assert_eq!(items, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_convert_is_lazy_and_skips_no_value() {
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let reader = StreamReader::from_vec(vec![1, 2, 3, 4]).convert(move |n: i32| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n % 2 == 0 {
                Ok(n * 10)
            } else {
                Err(StreamError::NoValue)
            }
        });
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(reader.drain().await.unwrap(), vec![20, 40]);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_convert_error_ends_stream() {
        let mut reader = StreamReader::from_vec(vec![1, 2, 3]).convert(|n: i32| {
            if n == 2 {
                Err(StreamError::Other("bad chunk".into()))
            } else {
                Ok(n)
            }
        });
        assert_eq!(reader.recv().await.unwrap(), Some(1));
        assert_eq!(reader.recv().await.unwrap_err().to_string(), "bad chunk");
        assert_eq!(reader.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_convert_with_drops_mapped_errors() {
        let (reader, mut writer) = pipe(4);
        writer.send(1).await;
        writer.send_error(StreamError::Other("transient".into())).await;

        let out = reader
            .convert_with(|n: i32| Ok(n + 1), |_| StreamError::NoValue)
            .drain()
            .await
            .unwrap();
        assert_eq!(out, vec![2]);
    }

    #[tokio::test]
    async fn test_convert_passes_upstream_error() {
        let (reader, mut writer) = pipe::<i32>(2);
        writer.send_error(StreamError::Closed).await;
        let err = reader.convert(|n| Ok(n)).drain().await.unwrap_err();
        assert!(matches!(err, StreamError::Closed));
    }

    #[tokio::test]
    async fn test_drain_returns_terminal_error() {
        let (reader, mut writer) = pipe(4);
        writer.send("x").await;
        writer.send_error(StreamError::Other("broken".into())).await;
        let err = reader.drain().await.unwrap_err();
        assert_eq!(err.to_string(), "broken");
    }

    #[tokio::test]
    async fn test_drop_reader_wakes_blocked_writer() {
        let (reader, mut writer) = pipe(1);
        assert!(!writer.send(1).await);
        let producer = tokio::spawn(async move { writer.send(2).await });
        tokio::task::yield_now().await;
        drop(reader);
        assert!(producer.await.unwrap());
    }

    #[tokio::test]
    async fn test_concat_messages_from_stream() {
        let (reader, mut writer) = pipe(4);
        tokio::spawn(async move {
            for piece in ["Hel", "lo", "!"] {
                writer.send(Message::assistant(piece, vec![])).await;
            }
        });
        let message = reader.concat().await.unwrap();
        assert_eq!(message.content, "Hello!");
    }

    #[tokio::test]
    async fn test_concat_empty_stream_fails() {
        let err = StreamReader::<Message>::from_vec(vec![]).concat().await.unwrap_err();
        assert!(matches!(err, StreamError::Concat(_)));
    }
}
