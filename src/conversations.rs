//! In-memory conversation continuity store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Maps caller phone numbers to their chat conversation ids.
///
/// Entries are created on the first successful assistant response for a
/// caller and overwritten whenever a newer id comes back; there is no expiry
/// and no persistence, so continuity is best-effort for the process lifetime.
/// Overlapping tasks for the same caller race, and the last writer wins -
/// callers of [`ConversationStore::set`] must tolerate that.
///
/// The lock is only ever held for the map operation itself, never across an
/// await point.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversation id for `caller`, or `None` on first contact.
    pub fn get(&self, caller: &str) -> Option<String> {
        self.inner.read().get(caller).cloned()
    }

    /// Record `conversation_id` for `caller`, replacing any previous value.
    pub fn set(&self, caller: &str, conversation_id: &str) {
        self.inner
            .write()
            .insert(caller.to_string(), conversation_id.to_string());
    }
}
