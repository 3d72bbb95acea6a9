//! Incremental decoder for the chat API's event stream.
//!
//! The response body arrives as arbitrary byte chunks that can split an event
//! line anywhere, including mid-codepoint. The decoder buffers raw bytes,
//! emits structured events only for complete lines, and never fails: lines it
//! cannot understand are logged and skipped so a single bad event cannot
//! abort an otherwise healthy stream.

use tracing::warn;

use super::messages::StreamPayload;

/// One structured event decoded from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental answer fragment, to be appended to the running answer.
    Answer(String),
    /// An updated conversation continuation id. Later updates supersede
    /// earlier ones within the same stream.
    ConversationId(String),
    /// Explicit end-of-stream marker (`data: [DONE]`).
    Done,
}

/// Byte-buffering line decoder. Feed it chunks as they arrive; call
/// [`SseDecoder::finish`] once the transport reports end-of-body to flush any
/// final line that lacked a trailing newline.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one transport chunk, returning the events completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            decode_line(&line[..line.len() - 1], &mut events);
        }
        events
    }

    /// Flush a trailing line that was never newline-terminated.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            decode_line(&line, &mut events);
        }
        events
    }
}

fn decode_line(raw: &[u8], events: &mut Vec<StreamEvent>) {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(_) => {
            warn!("skipping non-UTF-8 line in event stream");
            return;
        }
    };

    if line.is_empty() {
        return;
    }

    // Only `data:` lines carry payloads; comments, `event:` and `id:` lines
    // are part of the SSE framing and carry nothing the bridge needs.
    let Some(data) = line.strip_prefix("data:") else {
        return;
    };
    let data = data.trim();

    if data == "[DONE]" {
        events.push(StreamEvent::Done);
        return;
    }

    match serde_json::from_str::<StreamPayload>(data) {
        Ok(payload) => {
            if let Some(id) = payload.conversation_id.filter(|id| !id.is_empty()) {
                events.push(StreamEvent::ConversationId(id));
            }
            if let Some(answer) = payload.answer.filter(|answer| !answer.is_empty()) {
                events.push(StreamEvent::Answer(answer));
            }
        }
        Err(error) => {
            warn!(%error, line = %data, "skipping malformed event in stream");
        }
    }
}
