//! Twilio voice webhook handlers - the synchronous half of the bridge.
//!
//! Both handlers answer with a complete TwiML document and never touch the
//! network: the only work deferred past the response is the utterance task
//! handed to the orchestrator, which reaches the caller later through a live
//! call update. Identical events are never deduplicated; Twilio retries
//! simply start another task.

use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use crate::core::twilio::{CallStartEvent, SpeechResultEvent};
use crate::core::twiml::scripts;
use crate::orchestrator::UtteranceTask;
use crate::state::AppState;

/// Wrap a TwiML document in the `text/xml` response Twilio expects.
fn twiml_response(document: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], document).into_response()
}

/// Handler for POST /twilio-voice - the initial call webhook.
///
/// Greets the caller and opens the first speech prompt.
pub async fn call_start(
    State(state): State<Arc<AppState>>,
    Form(event): Form<CallStartEvent>,
) -> Response {
    info!(caller = %event.from, "incoming call");
    twiml_response(scripts::greeting(&state.config.default_assistant_name))
}

/// Handler for POST /gather - the speech recognition result webhook.
///
/// With usable speech and a call SID, replies with the hold script and hands
/// the utterance to the orchestrator. Empty speech gets a re-prompt; a
/// missing call SID gets an apology and hangup, since without the SID the
/// call can never be updated with an answer.
pub async fn speech_result(
    State(state): State<Arc<AppState>>,
    Form(event): Form<SpeechResultEvent>,
) -> Response {
    let speech = event.speech_result.as_deref().unwrap_or("").trim();
    info!(
        caller = %event.from,
        call_sid = event.call_sid.as_deref().unwrap_or("<missing>"),
        confidence = ?event.confidence,
        speech = %speech,
        "speech result received"
    );

    if speech.is_empty() {
        return twiml_response(scripts::reprompt());
    }

    let Some(call_sid) = event.call_sid.clone().filter(|sid| !sid.is_empty()) else {
        error!(caller = %event.from, "speech result without CallSid, ending call");
        return twiml_response(scripts::invalid_request());
    };

    state.orchestrator.submit(UtteranceTask {
        call_sid,
        caller: event.from.clone(),
        utterance: speech.to_string(),
    });

    twiml_response(scripts::processing_hold())
}
