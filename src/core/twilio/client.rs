//! REST client for mutating live calls.

use std::time::Duration;

use thiserror::Error;

use super::config::TwilioConfig;

/// Bound on one call-update request. These are small form POSTs; anything
/// slower than this means the call has likely already ended.
const UPDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the Twilio REST client.
#[derive(Debug, Error)]
pub enum TwilioError {
    #[error("Twilio request failed: {0}")]
    Request(String),

    /// Twilio rejected the update, e.g. because the call already ended.
    #[error("Twilio API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("invalid Twilio client configuration: {0}")]
    Configuration(String),
}

/// Seam for issuing live call updates. The orchestrator only depends on this
/// trait, so its behavior can be exercised without the real REST API.
#[async_trait::async_trait]
pub trait CallUpdater: Send + Sync {
    /// Replace the pending control script of call `call_sid` with `twiml`.
    async fn update_call(&self, call_sid: &str, twiml: &str) -> Result<(), TwilioError>;
}

/// HTTP client for the Twilio REST API.
#[derive(Debug, Clone)]
pub struct TwilioClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioClient {
    pub fn new(config: &TwilioConfig) -> Result<Self, TwilioError> {
        let http = reqwest::Client::builder()
            .timeout(UPDATE_TIMEOUT)
            .build()
            .map_err(|e| {
                TwilioError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl CallUpdater for TwilioClient {
    async fn update_call(&self, call_sid: &str, twiml: &str) -> Result<(), TwilioError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls/{}.json",
            self.base_url, self.account_sid, call_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("Twiml", twiml)])
            .send()
            .await
            .map_err(|e| TwilioError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown API error".to_string());
            return Err(TwilioError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_trailing_slash_from_base_url() {
        let client = TwilioClient::new(&TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            base_url: "https://api.twilio.com/".to_string(),
        })
        .unwrap();
        assert_eq!(client.base_url, "https://api.twilio.com");
    }
}
