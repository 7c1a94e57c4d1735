//! Shared OpenAI-compatible SSE stream parser
//!
//! Used by the openai and ollama providers, which speak the same streaming
//! dialect: `data:` events carrying `choices[0].delta.content`, terminated
//! by `[DONE]`.

use futures::StreamExt;
use serde_json::Value;

use crate::error::{VitalinkError, VitalinkResult};
use crate::llm::sse_decoder::{SseDecoder, SseEvent};
use crate::llm::streaming::{ChatStream, StreamChunk};

/// Turn an OpenAI-compatible SSE byte stream into a [`ChatStream`].
///
/// Events are reassembled through [`SseDecoder`], so chunks split mid-event
/// or mid-character decode correctly.
pub fn openai_sse_stream(
    byte_stream: impl futures::Stream<Item = Result<impl AsRef<[u8]> + Send + 'static, reqwest::Error>>
    + Send
    + 'static,
) -> ChatStream {
    let stream = byte_stream
        .scan(SseDecoder::new(), |decoder, chunk_result| {
            let out: Vec<VitalinkResult<StreamChunk>> = match chunk_result {
                Ok(chunk) => decoder
                    .feed(chunk.as_ref())
                    .into_iter()
                    .filter_map(chunk_from_event)
                    .collect(),
                Err(error) => vec![Err(VitalinkError::from(error))],
            };
            futures::future::ready(Some(futures::stream::iter(out)))
        })
        .flatten();

    Box::pin(stream)
}

fn chunk_from_event(event: SseEvent) -> Option<VitalinkResult<StreamChunk>> {
    if event.is_done() {
        return Some(Ok(StreamChunk::done("")));
    }

    let json: Value = match serde_json::from_str(&event.data) {
        Ok(json) => json,
        // Non-JSON keep-alives are dropped, not fatal
        Err(_) => return None,
    };

    json["choices"]
        .get(0)
        .and_then(|choice| choice["delta"]["content"].as_str())
        .map(|content| Ok(StreamChunk::delta(content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::streaming::collect_stream;

    fn byte_stream(
        chunks: Vec<Result<Vec<u8>, reqwest::Error>>,
    ) -> impl futures::Stream<Item = Result<Vec<u8>, reqwest::Error>> {
        futures::stream::iter(chunks)
    }

    #[tokio::test]
    async fn assembles_deltas_until_done() {
        let chunks = vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n".to_vec()),
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n".to_vec()),
            Ok(b"data: [DONE]\n\n".to_vec()),
        ];
        let stream = openai_sse_stream(byte_stream(chunks));
        assert_eq!(collect_stream(stream).await.unwrap(), "Hello");
    }

    #[tokio::test]
    async fn tolerates_events_split_across_chunks() {
        let chunks = vec![
            Ok(b"data: {\"choices\":[{\"delta\":".to_vec()),
            Ok(b"{\"content\":\"ok\"}}]}\n\ndata: [DONE]\n\n".to_vec()),
        ];
        let stream = openai_sse_stream(byte_stream(chunks));
        assert_eq!(collect_stream(stream).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn ignores_role_only_deltas() {
        let chunks = vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n".to_vec()),
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\n".to_vec()),
            Ok(b"data: [DONE]\n\n".to_vec()),
        ];
        let stream = openai_sse_stream(byte_stream(chunks));
        assert_eq!(collect_stream(stream).await.unwrap(), "x");
    }
}
