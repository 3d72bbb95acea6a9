//! Streaming HTTP client for the chat assistant API.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header;
use thiserror::Error;

use super::config::ChatConfig;
use super::messages::ChatRequest;
use super::sse::{SseDecoder, StreamEvent};

/// Path of the conversational endpoint, relative to the configured base URL.
pub const CHAT_MESSAGES_PATH: &str = "/chat-messages";

/// Errors from the chat API client.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request could not be built or sent (includes timeouts).
    #[error("chat API request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("chat API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// The response stream broke mid-body.
    #[error("chat stream read error: {0}")]
    Stream(String),

    #[error("invalid chat client configuration: {0}")]
    Configuration(String),
}

/// Client for the streaming chat endpoint.
///
/// The underlying HTTP client is built once and reused across requests for
/// connection pooling; its timeout bounds each complete streamed exchange.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ChatError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit one utterance and open the response event stream.
    ///
    /// Returns an error for transport failures and non-success statuses; in
    /// the latter case the response body is captured for logging.
    pub async fn stream_chat(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<ChatEventStream, ChatError> {
        let url = format!("{}{CHAT_MESSAGES_PATH}", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header(header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown API error".to_string());
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(ChatEventStream::new(response.bytes_stream()))
    }
}

/// Lazy sequence of [`StreamEvent`]s for one chat exchange.
///
/// Wraps the raw byte stream and the line decoder; callers pull events one at
/// a time and the next transport chunk is only read when the previous events
/// have been consumed.
pub struct ChatEventStream {
    bytes: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    decoder: SseDecoder,
    pending: VecDeque<StreamEvent>,
    done: bool,
}

impl ChatEventStream {
    pub(crate) fn new(
        bytes: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    ) -> Self {
        Self {
            bytes: Box::pin(bytes),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Next decoded event, or `Ok(None)` once the stream has ended (either
    /// end-of-body or an explicit `[DONE]` marker).
    pub async fn next_event(&mut self) -> Result<Option<StreamEvent>, ChatError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                if event == StreamEvent::Done {
                    self.done = true;
                    self.pending.clear();
                    return Ok(None);
                }
                return Ok(Some(event));
            }

            if self.done {
                return Ok(None);
            }

            match self.bytes.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.decoder.feed(&chunk)),
                Some(Err(error)) => {
                    self.done = true;
                    return Err(ChatError::Stream(error.to_string()));
                }
                None => {
                    self.done = true;
                    self.pending.extend(self.decoder.finish());
                }
            }
        }
    }
}
