//! Message thread manager.
//!
//! Encapsulates message creation for a session's conversation thread: the
//! participant rule for posting and the system-message convention used by
//! the lifecycle engine.

use super::message::{Message, MessageSender, MessageType};
use super::model::Session;
use super::repository::SessionStore;
use crate::error::{HotlineError, Result};
use chrono::Utc;
use std::sync::Arc;

/// Manages a session's append-only conversation thread.
///
/// All message writes go through this manager; the store guarantees that a
/// message's `session_id` references an existing session and that threads
/// are returned in creation order.
pub struct MessageThread {
    store: Arc<dyn SessionStore>,
}

impl MessageThread {
    /// Creates a new `MessageThread` over the given store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Appends a participant message to the session's thread.
    ///
    /// The sender identity is derived from the session: a sender matching
    /// the assigned expert posts as `Expert`, the requester posts as `User`.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` if `sender_id` is neither the session's
    /// requester nor its assigned expert.
    pub async fn post(
        &self,
        session: &Session,
        sender_id: &str,
        content: impl Into<String>,
        message_type: MessageType,
        code_snippet: Option<String>,
        code_language: Option<String>,
    ) -> Result<Message> {
        if !session.is_participant(sender_id) {
            return Err(HotlineError::access_denied(format!(
                "user '{}' is not a participant of session '{}'",
                sender_id, session.id
            )));
        }

        let sender = if session.expert_id.as_deref() == Some(sender_id) {
            MessageSender::Expert(sender_id.to_string())
        } else {
            MessageSender::User(sender_id.to_string())
        };

        let message = Message::new(&session.id, sender, message_type, content, Utc::now())
            .with_code(code_snippet, code_language);

        tracing::debug!(
            "[MessageThread] Posting {:?} to session {}",
            message.message_type,
            session.id
        );

        self.store.insert_message(message).await
    }

    /// Appends a lifecycle notification authored by the system sender.
    pub async fn post_system(&self, session: &Session, content: impl Into<String>) -> Result<Message> {
        let message = Message::new(
            &session.id,
            MessageSender::System,
            MessageType::SystemMessage,
            content,
            Utc::now(),
        );

        self.store.insert_message(message).await
    }

    /// Returns the session's thread ordered by creation time ascending.
    pub async fn thread(&self, session_id: &str) -> Result<Vec<Message>> {
        self.store.find_messages_by_session(session_id).await
    }
}
