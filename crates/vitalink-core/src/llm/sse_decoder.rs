//! Buffered server-sent-events decoder for provider streams
//!
//! Network chunks do not respect event boundaries, so the decoder buffers
//! partial events and partial UTF-8 sequences until the rest arrives. Both
//! the OpenAI format (`data:` only, `[DONE]` terminator) and the Anthropic
//! format (`event:` plus `data:`) parse through the same path.

/// A parsed SSE event
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// Optional `event:` field
    pub event_type: Option<String>,
    /// Joined `data:` payload
    pub data: String,
}

impl SseEvent {
    /// Whether this is the OpenAI `[DONE]` terminator
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// Incremental SSE parser.
///
/// Feed raw bytes as they arrive; complete events come back out, anything
/// partial stays buffered.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Decoded text waiting for an event terminator
    pending: String,
    /// Trailing bytes of a UTF-8 sequence split across chunks (at most 3)
    partial_utf8: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a network chunk, returning every event it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        if self.partial_utf8.is_empty() {
            self.decode_into_pending(chunk.to_vec());
        } else {
            let mut bytes = std::mem::take(&mut self.partial_utf8);
            bytes.extend_from_slice(chunk);
            self.decode_into_pending(bytes);
        }

        let mut events = Vec::new();
        while let Some((end, delim_len)) = self.next_event_boundary() {
            let raw: String = self.pending.drain(..end + delim_len).collect();
            if let Some(event) = parse_event(&raw) {
                events.push(event);
            }
        }
        events
    }

    /// Whether unconsumed bytes remain after the stream ended
    pub fn has_remaining(&self) -> bool {
        !self.pending.trim().is_empty() || !self.partial_utf8.is_empty()
    }

    fn decode_into_pending(&mut self, mut bytes: Vec<u8>) {
        loop {
            match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    self.pending.push_str(text);
                    return;
                }
                Err(error) => {
                    let valid = error.valid_up_to();
                    // Safe split: everything before valid_up_to decodes
                    self.pending
                        .push_str(std::str::from_utf8(&bytes[..valid]).unwrap_or_default());
                    match error.error_len() {
                        // Truncated sequence at the tail: hold it for the
                        // next chunk
                        None => {
                            self.partial_utf8 = bytes[valid..].to_vec();
                            return;
                        }
                        // Genuinely invalid bytes mid-stream: skip them
                        Some(len) => {
                            tracing::warn!(skipped = len, "invalid UTF-8 in SSE stream");
                            bytes.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }

    fn next_event_boundary(&self) -> Option<(usize, usize)> {
        let lf = self.pending.find("\n\n").map(|pos| (pos, 2));
        let crlf = self.pending.find("\r\n\r\n").map(|pos| (pos, 4));
        match (lf, crlf) {
            (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
            (a, b) => a.or(b),
        }
    }
}

/// Parse one raw event block. Events without a `data:` field (comments,
/// keep-alive pings) yield nothing.
fn parse_event(raw: &str) -> Option<SseEvent> {
    let mut event_type = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in raw.lines() {
        let line = line.trim_start();
        if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(SseEvent {
        event_type,
        data: data_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_data_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: {\"text\":\"hi\"}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"text\":\"hi\"}");
        assert!(events[0].event_type.is_none());
    }

    #[test]
    fn parses_typed_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"event: content_block_delta\ndata: {}\n\n");
        assert_eq!(
            events[0].event_type.as_deref(),
            Some("content_block_delta")
        );
    }

    #[test]
    fn buffers_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"par").is_empty());
        let events = decoder.feed(b"tial\":true}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"partial\":true}");
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn multiple_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: one\n\ndata: two\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "one");
        assert_eq!(events[1].data, "two");
    }

    #[test]
    fn joins_multi_line_data() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: a\ndata: b\n\n");
        assert_eq!(events[0].data, "a\nb");
    }

    #[test]
    fn recognizes_done_marker() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: [DONE]\n\n");
        assert!(events[0].is_done());
    }

    #[test]
    fn handles_crlf_delimiters() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"data: value\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "value");
    }

    #[test]
    fn skips_events_without_data() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(b"event: ping\n\ndata: real\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "real");
    }

    #[test]
    fn reassembles_utf8_split_mid_character() {
        // "é" is C3 A9; split between the two bytes
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: caf\xC3").is_empty());
        let events = decoder.feed(b"\xA9\n\n");
        assert_eq!(events[0].data, "caf\u{e9}");
    }

    #[test]
    fn reassembles_four_byte_emoji_across_three_chunks() {
        // U+1F600 is F0 9F 98 80
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: \xF0\x9F").is_empty());
        assert!(decoder.feed(b"\x98").is_empty());
        let events = decoder.feed(b"\x80\n\n");
        assert_eq!(events[0].data, "\u{1F600}");
    }

    #[test]
    fn drops_invalid_bytes_and_continues() {
        let mut decoder = SseDecoder::new();
        // 0xFF can never appear in UTF-8
        let events = decoder.feed(b"data: ok\xFFstill\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "okstill");
    }
}
