//! Sticky client-side identity for the current run.

use tutor_protocol::ChatId;
use tutor_protocol::UserId;
use tutor_protocol::protocol::ChatRequest;

/// Identifiers attached to every request of this process. Never persisted.
///
/// Once an identifier is set it is never replaced; the server is not consulted for identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<UserId>,
    chat_id: Option<ChatId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session pre-seeded from configuration. Seeded ids are sticky from the start.
    pub fn with_ids(user_id: Option<UserId>, chat_id: Option<ChatId>) -> Self {
        Self { user_id, chat_id }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        self.chat_id
    }

    /// Fills unset identifiers with their sentinels. Returns `true` if anything changed.
    pub(crate) fn bootstrap(&mut self) -> bool {
        let mut changed = false;
        if self.user_id.is_none() {
            self.user_id = Some(UserId::SENTINEL);
            changed = true;
        }
        if self.chat_id.is_none() {
            self.chat_id = Some(ChatId::SENTINEL);
            changed = true;
        }
        changed
    }

    pub(crate) fn envelope(&self, message: &str) -> ChatRequest {
        ChatRequest {
            user_id: self.user_id,
            chat_id: self.chat_id,
            message: message.to_string(),
        }
    }
}
