//! Chat API client configuration.

use std::time::Duration;

/// Default base URL for the chat assistant API.
pub const DEFAULT_CHAT_API_BASE_URL: &str = "https://api.next-agi.com/v1";

/// Default bound on one complete streamed exchange, connection to last byte.
/// Kept below the hold pause in the processing script so a timed-out task can
/// still deliver its recovery script before the caller-side fallback fires.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 40;

/// Configuration for [`super::ChatClient`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the chat API, without a trailing slash.
    pub base_url: String,
    /// Total timeout applied to each streaming request.
    pub request_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHAT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
