//! Session store trait.
//!
//! Defines the interface the lifecycle engine consumes for session and
//! message persistence.

use super::message::Message;
use super::model::{Session, SessionStatus};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An abstract store for sessions and their message threads.
///
/// This trait decouples the lifecycle engine from the specific storage
/// mechanism (in-memory, database, remote API).
///
/// # Implementation Notes
///
/// Implementations must uphold the ordering contracts documented on the
/// query methods, and must make `update_if_status` atomic with respect to
/// concurrent writers: under racing `update_if_status` calls for the same
/// session, at most one call that named the session's current status may
/// commit. This is what makes expert assignment exactly-once.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a newly created session.
    async fn insert_session(&self, session: Session) -> Result<Session>;

    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Lists all sessions opened by the given requester.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Session>>;

    /// Lists sessions in `Waiting` status, ordered by priority descending
    /// then creation time ascending (oldest-highest-priority first).
    ///
    /// This ordering is the dispatch contract for any queue-serving caller.
    async fn find_waiting(&self) -> Result<Vec<Session>>;

    /// Lists all sessions assigned to the given expert.
    async fn find_by_expert(&self, expert_id: &str) -> Result<Vec<Session>>;

    /// Conditionally writes back a mutated session.
    ///
    /// The write commits only if the stored session still holds `expected`
    /// status; otherwise a concurrent writer won the race.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session no longer exists
    /// - `Conflict` if the stored status is no longer `expected`
    async fn update_if_status(&self, session: &Session, expected: SessionStatus) -> Result<()>;

    /// Appends a message to its session's thread.
    async fn insert_message(&self, message: Message) -> Result<Message>;

    /// Returns a session's thread ordered by creation time ascending.
    async fn find_messages_by_session(&self, session_id: &str) -> Result<Vec<Message>>;

    /// Replaces a message in place (edited/read/acceptance field updates).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the message does not exist.
    async fn update_message(&self, message: &Message) -> Result<()>;

    /// Lists sessions with `created_at` inside `[start, end]`.
    ///
    /// A `None` bound is unbounded on that side; with both bounds `None`
    /// this returns every session.
    async fn find_sessions_in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Session>>;
}
