//! Twilio integration: inbound webhook payloads and the REST client used to
//! replace the control script of an in-progress call.

mod client;
mod config;
mod messages;

pub use client::{CallUpdater, TwilioClient, TwilioError};
pub use config::{DEFAULT_TWILIO_API_BASE_URL, TwilioConfig};
pub use messages::{CallStartEvent, SpeechResultEvent};
