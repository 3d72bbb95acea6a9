//! The fixed call scripts, one per state a bridged call can be in.
//!
//! Each function maps a semantic intent (greet, hold, re-prompt, reply,
//! recover, reject) to its TwiML document. All of them are pure.

use super::builder::VoiceResponse;

/// Webhook path Twilio hits when a call connects.
pub const VOICE_WEBHOOK_PATH: &str = "/twilio-voice";

/// Webhook path Twilio posts speech recognition results to.
pub const GATHER_WEBHOOK_PATH: &str = "/gather";

/// How long the processing script keeps the call alive while the assistant
/// answer is generated out-of-band. Must exceed the chat request timeout so
/// the live update lands before the fallback fires.
pub const PROCESSING_HOLD_SECS: u32 = 45;

/// Greet the caller and open the first speech prompt. The trailing redirect
/// re-runs the greeting if the gather captures nothing, so silence never
/// strands the call.
pub fn greeting(assistant_name: &str) -> String {
    VoiceResponse::new()
        .say(&format!(
            "Welcome to the {assistant_name}. How can I help you today?"
        ))
        .gather_speech(GATHER_WEBHOOK_PATH)
        .redirect(VOICE_WEBHOOK_PATH)
        .build()
}

/// Acknowledge the utterance and hold the line while the answer is produced.
///
/// The pause keeps the call parked until the orchestrator replaces this
/// script via a live call update. If no update ever arrives, the spoken
/// fallback and redirect after the pause recover the call on their own.
pub fn processing_hold() -> String {
    VoiceResponse::new()
        .say("Okay, let me process that.")
        .pause(PROCESSING_HOLD_SECS)
        .say("Something went wrong while processing. Please try again.")
        .redirect(VOICE_WEBHOOK_PATH)
        .build()
}

/// Ask the caller to repeat after an empty recognition result.
pub fn reprompt() -> String {
    VoiceResponse::new()
        .say("Sorry, I didn't catch that. Could you please repeat?")
        .gather_speech(GATHER_WEBHOOK_PATH)
        .redirect(VOICE_WEBHOOK_PATH)
        .build()
}

/// Apologize and end the call. Used when the event carries no call SID:
/// without one there is no way to update the call later, so continuing
/// the conversation is not possible.
pub fn invalid_request() -> String {
    VoiceResponse::new()
        .say("An internal error occurred. Please hang up and try again.")
        .hangup()
        .build()
}

fn follow_up(line: &str) -> String {
    VoiceResponse::new()
        .say(line)
        .gather_speech(GATHER_WEBHOOK_PATH)
        .say("Did you have another question?")
        .redirect(VOICE_WEBHOOK_PATH)
        .build()
}

/// Speak the assistant's answer, then listen for the next utterance.
pub fn spoken_reply(answer: &str) -> String {
    follow_up(answer)
}

/// The answer-less variant of [`spoken_reply`], for streams that completed
/// without producing any answer text.
pub fn empty_reply() -> String {
    follow_up("Sorry, I couldn't generate a response for that.")
}

/// Apologize for a processing failure and restart the call flow, so the
/// caller can try again by speaking again.
pub fn error_recovery() -> String {
    VoiceResponse::new()
        .say("Sorry, an error occurred while processing your request. Please try again.")
        .pause(1)
        .redirect(VOICE_WEBHOOK_PATH)
        .build()
}
