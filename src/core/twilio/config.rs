//! Twilio REST client configuration.

/// Default origin of the Twilio REST API.
pub const DEFAULT_TWILIO_API_BASE_URL: &str = "https://api.twilio.com";

/// Configuration for [`super::TwilioClient`].
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Account SID, used both in request paths and as the basic-auth user.
    pub account_sid: String,
    /// Auth token, used as the basic-auth password.
    pub auth_token: String,
    /// API origin, overridable so tests can point the client at a local mock.
    pub base_url: String,
}
