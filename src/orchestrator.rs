//! Asynchronous utterance processing.
//!
//! Webhook handlers must answer Twilio quickly, so the slow work (the chat
//! exchange and the live call update) runs out-of-band. Handlers publish
//! [`UtteranceTask`] items through the [`Orchestrator`] handle and return
//! immediately; a dispatcher loop owns the receiving end and spawns one
//! detached task per utterance. The dispatcher is the error boundary: every
//! failure inside a task converges to the recovery script, delivered over the
//! same live-update channel as a real answer.
//!
//! Tasks are never deduplicated or ordered: resubmitting an identical event
//! starts a fresh task, and overlapping utterances for one caller race with
//! last-write-wins conversation tracking.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::AssistantKeys;
use crate::conversations::ConversationStore;
use crate::core::chat::{ChatClient, ChatError, ChatRequest, StreamEvent};
use crate::core::twilio::CallUpdater;
use crate::core::twiml::scripts;

/// One recognized utterance awaiting processing.
#[derive(Debug, Clone)]
pub struct UtteranceTask {
    /// SID of the call currently parked on the hold script.
    pub call_sid: String,
    /// Caller phone number; conversation key and chat user tag.
    pub caller: String,
    /// The recognized speech text.
    pub utterance: String,
}

/// Shared dependencies injected into every task.
pub struct TaskContext {
    /// Display name of the active assistant, used for key resolution and
    /// nothing else.
    pub assistant_name: String,
    pub keys: AssistantKeys,
    pub conversations: ConversationStore,
    pub chat: ChatClient,
    pub calls: Arc<dyn CallUpdater>,
}

#[derive(Debug, Error)]
enum TaskError {
    #[error("no chat API key configured for assistant '{0}'")]
    MissingApiKey(String),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// Submission handle for utterance work.
///
/// Cheap to clone; all clones feed the same dispatcher.
#[derive(Clone)]
pub struct Orchestrator {
    queue: mpsc::UnboundedSender<UtteranceTask>,
}

impl Orchestrator {
    /// Start the dispatcher loop and return the submission handle.
    ///
    /// The loop runs for the life of the process; it ends only when every
    /// handle has been dropped.
    pub fn start(context: TaskContext) -> Self {
        let (queue, inbox) = mpsc::unbounded_channel();
        tokio::spawn(dispatch(inbox, Arc::new(context)));
        Self { queue }
    }

    /// Queue a task for processing. Never blocks.
    pub fn submit(&self, task: UtteranceTask) {
        if let Err(rejected) = self.queue.send(task) {
            // Only reachable if the dispatcher itself died; the caller is
            // already holding the processing script, whose fallback will
            // recover the call.
            error!(call_sid = %rejected.0.call_sid, "dispatcher gone, dropping utterance task");
        }
    }
}

async fn dispatch(mut inbox: mpsc::UnboundedReceiver<UtteranceTask>, context: Arc<TaskContext>) {
    while let Some(task) = inbox.recv().await {
        let context = Arc::clone(&context);
        tokio::spawn(async move {
            run_task(&context, task).await;
        });
    }
}

/// Process one utterance to completion and push the resulting script to the
/// live call. Infallible: failures become the recovery script, and a failed
/// live update is logged only: at that point there is no channel left to
/// reach the caller, and the hold script's own fallback takes over.
async fn run_task(context: &TaskContext, task: UtteranceTask) {
    info!(call_sid = %task.call_sid, utterance = %task.utterance, "processing utterance");

    let twiml = match answer_utterance(context, &task).await {
        Ok(twiml) => twiml,
        Err(error) => {
            error!(call_sid = %task.call_sid, %error, "utterance processing failed");
            scripts::error_recovery()
        }
    };

    if let Err(error) = context.calls.update_call(&task.call_sid, &twiml).await {
        error!(call_sid = %task.call_sid, %error, "live call update failed");
    }
}

/// Run the chat exchange for one utterance and build the follow-up script.
async fn answer_utterance(context: &TaskContext, task: &UtteranceTask) -> Result<String, TaskError> {
    // Snapshot the continuation id up front; concurrent tasks for the same
    // caller may change the store while this one is in flight.
    let snapshot = context.conversations.get(&task.caller).unwrap_or_default();

    let api_key = context
        .keys
        .key_for(&context.assistant_name)
        .ok_or_else(|| TaskError::MissingApiKey(context.assistant_name.clone()))?;

    let request = ChatRequest::streaming(&task.utterance, &snapshot, &task.caller);
    let started = Instant::now();
    let mut events = context.chat.stream_chat(api_key, &request).await?;

    let mut answer = String::new();
    let mut conversation_id = snapshot.clone();
    while let Some(event) = events.next_event().await? {
        match event {
            StreamEvent::Answer(fragment) => answer.push_str(&fragment),
            StreamEvent::ConversationId(id) => conversation_id = id,
            StreamEvent::Done => break,
        }
    }

    info!(
        call_sid = %task.call_sid,
        elapsed_ms = started.elapsed().as_millis() as u64,
        answer_len = answer.len(),
        "chat exchange complete"
    );

    if !conversation_id.is_empty() && conversation_id != snapshot {
        info!(
            call_sid = %task.call_sid,
            caller = %task.caller,
            %conversation_id,
            "storing updated conversation id"
        );
        context.conversations.set(&task.caller, &conversation_id);
    }

    if answer.trim().is_empty() {
        info!(call_sid = %task.call_sid, "stream completed without answer text");
        Ok(scripts::empty_reply())
    } else {
        Ok(scripts::spoken_reply(&answer))
    }
}
