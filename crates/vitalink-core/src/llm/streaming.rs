//! Streaming chat types and helpers

use futures::StreamExt;
use futures::stream::Stream;
use std::pin::Pin;

use crate::error::VitalinkResult;

/// One incremental piece of a streamed chat response
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    /// Text delta; may be empty on the terminating chunk
    pub content: String,
    /// Set on the last chunk of the stream
    pub final_chunk: bool,
}

impl StreamChunk {
    /// An intermediate content delta
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            final_chunk: false,
        }
    }

    /// The terminating chunk, optionally carrying trailing content
    pub fn done(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            final_chunk: true,
        }
    }
}

/// A stream of chat response chunks
pub type ChatStream = Pin<Box<dyn Stream<Item = VitalinkResult<StreamChunk>> + Send>>;

/// Wrap a complete response as a single-chunk stream.
///
/// Used when a caller asked for streaming but the serving provider only
/// supports synchronous completion.
pub fn single_chunk_stream(content: impl Into<String>) -> ChatStream {
    let content = content.into();
    Box::pin(futures::stream::once(async move {
        Ok(StreamChunk::done(content))
    }))
}

/// Drain a stream and concatenate its content deltas.
///
/// Stops at the first error or at the final chunk, whichever comes first.
pub async fn collect_stream(mut stream: ChatStream) -> VitalinkResult<String> {
    let mut content = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        content.push_str(&chunk.content);
        if chunk.final_chunk {
            break;
        }
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VitalinkError;

    #[tokio::test]
    async fn single_chunk_stream_yields_once() {
        let stream = single_chunk_stream("complete answer");
        let collected = collect_stream(stream).await.unwrap();
        assert_eq!(collected, "complete answer");
    }

    #[tokio::test]
    async fn collect_concatenates_deltas() {
        let chunks = vec![
            Ok(StreamChunk::delta("Hel")),
            Ok(StreamChunk::delta("lo")),
            Ok(StreamChunk::done("")),
        ];
        let stream: ChatStream = Box::pin(futures::stream::iter(chunks));
        assert_eq!(collect_stream(stream).await.unwrap(), "Hello");
    }

    #[tokio::test]
    async fn collect_surfaces_mid_stream_errors() {
        let chunks = vec![
            Ok(StreamChunk::delta("partial")),
            Err(VitalinkError::http("connection reset")),
        ];
        let stream: ChatStream = Box::pin(futures::stream::iter(chunks));
        assert!(collect_stream(stream).await.is_err());
    }
}
