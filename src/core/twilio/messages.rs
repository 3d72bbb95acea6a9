//! Inbound webhook payloads. Twilio delivers these as URL-encoded forms with
//! PascalCase field names.

use serde::Deserialize;

/// Form body of the initial voice webhook, posted when a call connects.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallStartEvent {
    /// Caller's phone number in E.164 form.
    #[serde(default)]
    pub from: String,
}

/// Form body of the gather-action webhook, posted after speech recognition.
///
/// `speech_result` and `call_sid` are optional on purpose: the handlers
/// branch on their absence rather than rejecting the request outright.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpeechResultEvent {
    #[serde(default)]
    pub from: String,
    /// Recognized text, absent or empty when recognition failed.
    pub speech_result: Option<String>,
    /// Recognition confidence in `[0, 1]`, logged only.
    pub confidence: Option<f64>,
    /// SID of the active call; without it the call cannot be updated later.
    pub call_sid: Option<String>,
}
