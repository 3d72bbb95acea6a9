//! Client for the streaming chat assistant API.
//!
//! The upstream is a Dify-style conversational endpoint: one POST per
//! utterance, answered as a server-sent event stream whose `data:` lines carry
//! incremental answer fragments and conversation-id updates.

mod client;
mod config;
mod messages;
mod sse;

pub use client::{CHAT_MESSAGES_PATH, ChatClient, ChatError, ChatEventStream};
pub use config::{ChatConfig, DEFAULT_CHAT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use messages::ChatRequest;
pub use sse::{SseDecoder, StreamEvent};
