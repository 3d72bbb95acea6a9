//! Request and stream payload types for the chat API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a `POST /chat-messages` request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Structured app inputs. The voice bridge has none, so this is always
    /// an empty object.
    pub inputs: Value,
    /// The recognized caller utterance.
    pub query: String,
    pub response_mode: String,
    /// Continuation token from a previous exchange; empty on first contact.
    pub conversation_id: String,
    /// End-user tag, set to the caller's phone number.
    pub user: String,
    pub files: Vec<Value>,
}

impl ChatRequest {
    /// Build a streaming-mode request for one utterance.
    pub fn streaming(query: &str, conversation_id: &str, user: &str) -> Self {
        Self {
            inputs: Value::Object(serde_json::Map::new()),
            query: query.to_string(),
            response_mode: "streaming".to_string(),
            conversation_id: conversation_id.to_string(),
            user: user.to_string(),
            files: Vec::new(),
        }
    }
}

/// JSON payload of one `data:` line in the event stream. Fields beyond the
/// two the bridge consumes are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct StreamPayload {
    pub conversation_id: Option<String>,
    pub answer: Option<String>,
}
