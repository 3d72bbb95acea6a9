//! Shared application state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::conversations::ConversationStore;
use crate::core::chat::ChatClient;
use crate::core::twilio::TwilioClient;
use crate::orchestrator::{Orchestrator, TaskContext};

/// State shared by all request handlers.
///
/// Owns the conversation store and the orchestrator handle; both are created
/// once at startup and live until shutdown.
pub struct AppState {
    pub config: ServerConfig,
    pub conversations: ConversationStore,
    pub orchestrator: Orchestrator,
}

impl AppState {
    /// Build the upstream clients and start the orchestrator.
    ///
    /// Must run inside a tokio runtime: starting the orchestrator spawns its
    /// dispatcher loop.
    pub fn new(
        config: ServerConfig,
    ) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let chat = ChatClient::new(&config.chat_config())?;
        let twilio = TwilioClient::new(&config.twilio_config())?;
        let conversations = ConversationStore::new();

        let orchestrator = Orchestrator::start(TaskContext {
            assistant_name: config.default_assistant_name.clone(),
            keys: config.assistant_keys.clone(),
            conversations: conversations.clone(),
            chat,
            calls: Arc::new(twilio),
        });

        Ok(Arc::new(Self {
            config,
            conversations,
            orchestrator,
        }))
    }
}
