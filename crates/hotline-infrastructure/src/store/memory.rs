//! In-memory session store.
//!
//! A `SessionStore` implementation backed by `tokio::sync::RwLock` maps.
//! Suitable for tests, demos and single-process embedders; the conditional
//! `update_if_status` write is atomic under the store's write lock, which is
//! what gives the engine exactly-once expert assignment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hotline_core::error::{HotlineError, Result};
use hotline_core::session::{Message, Session, SessionStatus, SessionStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`SessionStore`].
pub struct InMemorySessionStore {
    /// Sessions keyed by ID
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    /// Messages in insertion order, across all sessions
    messages: Arc<RwLock<Vec<Message>>>,
}

impl InMemorySessionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert_session(&self, session: Session) -> Result<Session> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|s| s.requester_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.created_at);
        Ok(found)
    }

    async fn find_waiting(&self) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut waiting: Vec<Session> = sessions
            .values()
            .filter(|s| s.status == SessionStatus::Waiting)
            .cloned()
            .collect();
        // Dispatch contract: priority descending, then oldest first.
        waiting.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(waiting)
    }

    async fn find_by_expert(&self, expert_id: &str) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|s| s.expert_id.as_deref() == Some(expert_id))
            .cloned()
            .collect();
        found.sort_by_key(|s| s.created_at);
        Ok(found)
    }

    async fn update_if_status(&self, session: &Session, expected: SessionStatus) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(&session.id)
            .ok_or_else(|| HotlineError::not_found("Session", &session.id))?;

        if stored.status != expected {
            tracing::warn!(
                "[InMemorySessionStore] Conditional update of {} lost: expected {}, found {}",
                session.id,
                expected,
                stored.status
            );
            return Err(HotlineError::conflict(format!(
                "session '{}' expected status {} but found {}",
                session.id, expected, stored.status
            )));
        }

        *stored = session.clone();
        Ok(())
    }

    async fn insert_message(&self, message: Message) -> Result<Message> {
        let sessions = self.sessions.read().await;
        if !sessions.contains_key(&message.session_id) {
            return Err(HotlineError::not_found("Session", &message.session_id));
        }
        drop(sessions);

        let mut messages = self.messages.write().await;
        messages.push(message.clone());
        Ok(message)
    }

    async fn find_messages_by_session(&self, session_id: &str) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut thread: Vec<Message> = messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        thread.sort_by_key(|m| m.created_at);
        Ok(thread)
    }

    async fn update_message(&self, message: &Message) -> Result<()> {
        let mut messages = self.messages.write().await;
        let stored = messages
            .iter_mut()
            .find(|m| m.id == message.id)
            .ok_or_else(|| HotlineError::not_found("Message", &message.id))?;
        *stored = message.clone();
        Ok(())
    }

    async fn find_sessions_in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| start.is_none_or(|t| s.created_at >= t))
            .filter(|s| end.is_none_or(|t| s.created_at <= t))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotline_core::session::{MessageSender, MessageType, NewSessionRequest, Priority};

    fn session(requester: &str, priority: Priority, created_at: DateTime<Utc>) -> Session {
        Session::new(requester, NewSessionRequest::default(), priority, created_at)
    }

    #[tokio::test]
    async fn test_find_waiting_orders_by_priority_then_age() {
        let store = InMemorySessionStore::new();
        let t0 = Utc::now();

        let old_normal = session("u1", Priority::Normal, t0);
        let young_high = session("u2", Priority::High, t0 + chrono::Duration::minutes(2));
        let old_high = session("u3", Priority::High, t0 + chrono::Duration::minutes(1));
        for s in [&old_normal, &young_high, &old_high] {
            store.insert_session(s.clone()).await.unwrap();
        }

        let waiting = store.find_waiting().await.unwrap();
        let ids: Vec<&str> = waiting.iter().map(|s| s.id.as_str()).collect();

        assert_eq!(ids, vec![&old_high.id, &young_high.id, &old_normal.id]);
    }

    #[tokio::test]
    async fn test_update_if_status_rejects_stale_writer() {
        let store = InMemorySessionStore::new();
        let t0 = Utc::now();
        let waiting = session("u1", Priority::Normal, t0);
        store.insert_session(waiting.clone()).await.unwrap();

        // Two writers read the same WAITING session and both try to assign.
        let mut first = waiting.clone();
        first.assign("expert-1", t0).unwrap();
        let mut second = waiting.clone();
        second.assign("expert-2", t0).unwrap();

        store
            .update_if_status(&first, SessionStatus::Waiting)
            .await
            .unwrap();
        let err = store
            .update_if_status(&second, SessionStatus::Waiting)
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        let stored = store.find_by_id(&waiting.id).await.unwrap().unwrap();
        assert_eq!(stored.expert_id.as_deref(), Some("expert-1"));
    }

    #[tokio::test]
    async fn test_insert_message_requires_existing_session() {
        let store = InMemorySessionStore::new();
        let message = Message::new(
            "ghost-session",
            MessageSender::System,
            MessageType::SystemMessage,
            "hello",
            Utc::now(),
        );

        let err = store.insert_message(message).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_find_sessions_in_range_bounds() {
        let store = InMemorySessionStore::new();
        let t0 = Utc::now();
        for offset in [0, 10, 20, 40] {
            store
                .insert_session(session(
                    "u1",
                    Priority::Normal,
                    t0 + chrono::Duration::minutes(offset),
                ))
                .await
                .unwrap();
        }

        let inside = store
            .find_sessions_in_range(
                Some(t0 + chrono::Duration::minutes(5)),
                Some(t0 + chrono::Duration::minutes(30)),
            )
            .await
            .unwrap();
        assert_eq!(inside.len(), 2);

        let all = store.find_sessions_in_range(None, None).await.unwrap();
        assert_eq!(all.len(), 4);
    }
}
