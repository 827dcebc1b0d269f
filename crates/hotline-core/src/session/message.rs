//! Conversation message types.
//!
//! This module contains types for representing messages in a session's
//! conversation thread, including sender identity and message kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the party that authored a message.
///
/// Lifecycle notifications are attributed to an explicit `System` variant
/// rather than overloading the requester's identity, so "who posted" is never
/// conflated with "whose session this is".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageSender {
    /// The requester who owns the session.
    User(String),
    /// The expert assigned to the session.
    Expert(String),
    /// The lifecycle engine itself.
    System,
}

impl MessageSender {
    /// Returns the user identifier behind this sender, if any.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User(id) | Self::Expert(id) => Some(id),
            Self::System => None,
        }
    }
}

/// Kind of a message in a session thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Free-text message from the requester.
    UserMessage,
    /// Free-text message from the assigned expert.
    ExpertMessage,
    /// Lifecycle notification emitted by the engine.
    SystemMessage,
    /// Message whose payload is primarily a code snippet.
    CodeSnippet,
    /// Message carrying attachment references.
    FileAttachment,
    /// A proposed solution from the expert.
    Solution,
}

/// One entry in a session's conversation thread.
///
/// Messages are append-only and immutable except for the edited/read/solution
/// acceptance fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format)
    pub id: String,
    /// Identifier of the owning session
    pub session_id: String,
    /// Who authored the message
    pub sender: MessageSender,
    /// Kind of message
    pub message_type: MessageType,
    /// Body text
    pub content: String,
    /// Optional code snippet accompanying the body
    pub code_snippet: Option<String>,
    /// Language of the code snippet, if any
    pub code_language: Option<String>,
    /// Attachment references
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Whether the body was edited after posting
    #[serde(default)]
    pub edited: bool,
    /// Timestamp of the last edit
    pub edited_at: Option<DateTime<Utc>>,
    /// Timestamp when the counterparty read the message
    pub read_at: Option<DateTime<Utc>>,
    /// Whether the expert flagged this message as their solution
    #[serde(default)]
    pub is_expert_solution: bool,
    /// Whether the requester accepted the flagged solution
    #[serde(default)]
    pub solution_accepted: bool,
    /// Timestamp of the acceptance
    pub solution_accepted_at: Option<DateTime<Utc>>,
    /// Timestamp when the message was created
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a new unread message with a fresh identifier.
    pub fn new(
        session_id: impl Into<String>,
        sender: MessageSender,
        message_type: MessageType,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            sender,
            message_type,
            content: content.into(),
            code_snippet: None,
            code_language: None,
            attachments: Vec::new(),
            edited: false,
            edited_at: None,
            read_at: None,
            is_expert_solution: message_type == MessageType::Solution,
            solution_accepted: false,
            solution_accepted_at: None,
            created_at: now,
        }
    }

    /// Attaches a code snippet and its language to the message.
    pub fn with_code(mut self, snippet: Option<String>, language: Option<String>) -> Self {
        self.code_snippet = snippet;
        self.code_language = language;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_is_unread() {
        let message = Message::new(
            "session-1",
            MessageSender::User("user-1".to_string()),
            MessageType::UserMessage,
            "hello",
            Utc::now(),
        );

        assert!(message.read_at.is_none());
        assert!(!message.edited);
        assert!(!message.is_expert_solution);
        assert_eq!(message.session_id, "session-1");
    }

    #[test]
    fn test_solution_message_is_flagged() {
        let message = Message::new(
            "session-1",
            MessageSender::Expert("expert-1".to_string()),
            MessageType::Solution,
            "use Rc<RefCell<_>>",
            Utc::now(),
        );

        assert!(message.is_expert_solution);
        assert!(!message.solution_accepted);
    }

    #[test]
    fn test_system_sender_has_no_user_id() {
        assert_eq!(MessageSender::System.user_id(), None);
        assert_eq!(
            MessageSender::Expert("e".to_string()).user_id(),
            Some("e")
        );
    }

    #[test]
    fn test_with_code_sets_snippet_fields() {
        let message = Message::new(
            "session-1",
            MessageSender::User("user-1".to_string()),
            MessageType::CodeSnippet,
            "this panics",
            Utc::now(),
        )
        .with_code(Some("fn main() {}".to_string()), Some("rust".to_string()));

        assert_eq!(message.code_language.as_deref(), Some("rust"));
        assert!(message.code_snippet.is_some());
    }
}
