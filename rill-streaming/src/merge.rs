//! Fan-in of several readers.

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::reader::StreamReader;

/// Combine readers into one that yields chunks in completion order.
///
/// Each input keeps its own order. The merged reader ends once every input
/// has ended. The first error from any input is delivered as the terminal
/// error and the remaining inputs are dropped.
pub fn merge<T>(mut readers: Vec<StreamReader<T>>) -> StreamReader<T>
where
    T: Send + 'static,
{
    debug!(sources = readers.len(), "merging streams");
    if readers.len() == 1 {
        if let Some(only) = readers.pop() {
            return only;
        }
    }

    let tagged = readers
        .into_iter()
        .enumerate()
        .map(|(source, reader)| reader.map(move |item| (source, item)));
    let merged = stream::select_all(tagged).map(|(source, item)| {
        if let Err(err) = &item {
            warn!(source, error = %err, "merged source failed");
        }
        item
    });
    StreamReader::from_stream(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use crate::pipe::pipe;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_merge_keeps_per_source_order() {
        let mut readers = Vec::new();
        for source in 0..3 {
            let (reader, mut writer) = pipe(1);
            tokio::spawn(async move {
                for i in 0..4 {
                    if writer.send((source, i)).await {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            });
            readers.push(reader);
        }

        let all = merge(readers).drain().await.unwrap();
        assert_eq!(all.len(), 12);
        for source in 0..3 {
            let seen: Vec<_> = all.iter().filter(|(s, _)| *s == source).map(|(_, i)| *i).collect();
            assert_eq!(seen, vec![0, 1, 2, 3]);
        }
    }

    #[tokio::test]
    async fn test_merge_empty_and_single() {
        let empty: Vec<StreamReader<u8>> = Vec::new();
        assert!(merge(empty).drain().await.unwrap().is_empty());

        let single = merge(vec![StreamReader::from_vec(vec![1, 2])]);
        assert_eq!(single.drain().await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_merge_error_drops_other_sources() {
        let (failing, mut failing_writer) = pipe::<i32>(1);
        let (slow, mut slow_writer) = pipe::<i32>(1);

        let mut merged = merge(vec![failing, slow]);
        failing_writer
            .send_error(StreamError::Other("source failed".into()))
            .await;

        let err = merged.recv().await.unwrap_err();
        assert_eq!(err.to_string(), "source failed");
        assert_eq!(merged.recv().await.unwrap(), None);

        // The surviving source was dropped along with the merge.
        assert!(slow_writer.send(1).await);
    }
}
