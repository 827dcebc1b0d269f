//! Session lifecycle engine.
//!
//! Owns the session state machine, priority assignment, timestamps and the
//! authorization checks for every mutating operation. Persistence goes
//! through the [`SessionStore`] collaborator; quota questions go through the
//! [`QuotaGate`] collaborator. Each operation is one short synchronous unit
//! of work with no internal waiting or retries.

use super::message::{Message, MessageType};
use super::model::{NewSessionRequest, Session};
use super::quota::{QuotaGate, UsageKind};
use super::repository::SessionStore;
use super::thread::MessageThread;
use crate::error::{HotlineError, Result};
use chrono::Utc;
use std::sync::Arc;

/// Orchestrates the support-session lifecycle.
///
/// `SessionEngine` is responsible for:
/// - Creating sessions (quota check, tier-derived priority)
/// - Authorizing reads and mutations (requester/expert participant rule)
/// - Driving state transitions (assignment, resolution, closure, rating)
/// - Emitting a system message for every lifecycle event
///
/// Cross-operation atomicity is delegated to the store: every session write
/// is a conditional `update_if_status` keyed on the status the engine read,
/// so racing transitions surface as `Conflict` instead of lost updates.
pub struct SessionEngine {
    /// Durable storage for sessions and messages
    store: Arc<dyn SessionStore>,
    /// External quota/subscription collaborator
    quota: Arc<dyn QuotaGate>,
    /// Thread manager for participant and system messages
    thread: MessageThread,
}

impl SessionEngine {
    /// Creates a new `SessionEngine` with its collaborators.
    ///
    /// # Arguments
    ///
    /// * `store` - Backend for session and message persistence
    /// * `quota` - Gate answering quota and subscription questions
    pub fn new(store: Arc<dyn SessionStore>, quota: Arc<dyn QuotaGate>) -> Self {
        Self {
            thread: MessageThread::new(store.clone()),
            store,
            quota,
        }
    }

    /// Opens a new session for `requester_id` in `Waiting` status.
    ///
    /// Priority is derived from the requester's subscription tier via the
    /// exhaustive tier mapping. One unit of usage is recorded against the
    /// requester, and a system message announces the assigned priority and
    /// the tier's response-time commitment.
    ///
    /// # Errors
    ///
    /// - `QuotaExceeded` if the requester has no remaining allowance
    /// - `DataAccess` if a collaborator fails
    pub async fn create_session(
        &self,
        requester_id: &str,
        request: NewSessionRequest,
    ) -> Result<Session> {
        if !self.quota.check_usage_limits(requester_id).await? {
            return Err(HotlineError::quota_exceeded(requester_id));
        }

        let subscription = self.quota.subscription(requester_id).await?;
        let priority = subscription.tier.session_priority();

        let session = Session::new(requester_id, request, priority, Utc::now());
        let session = self.store.insert_session(session).await?;

        self.quota
            .record_usage(requester_id, UsageKind::ExpertSession)
            .await?;

        self.thread
            .post_system(
                &session,
                format!(
                    "Session opened with {} priority. Expected first response within {} hours.",
                    session.priority, subscription.features.response_time_hours
                ),
            )
            .await?;

        tracing::info!(
            "[SessionEngine] Created session {} for {} ({} priority)",
            session.id,
            requester_id,
            session.priority
        );

        Ok(session)
    }

    /// Fetches a session on behalf of a participant.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no such session exists
    /// - `AccessDenied` if the caller is neither requester nor expert
    pub async fn get_session(&self, session_id: &str, requesting_user_id: &str) -> Result<Session> {
        let session = self
            .store
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| HotlineError::not_found("Session", session_id))?;

        if !session.is_participant(requesting_user_id) {
            return Err(HotlineError::access_denied(format!(
                "user '{}' is not a participant of session '{}'",
                requesting_user_id, session_id
            )));
        }

        Ok(session)
    }

    /// Lists all sessions opened by the given requester.
    pub async fn list_user_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        self.store.find_by_user(user_id).await
    }

    /// Lists waiting sessions in dispatch order: priority descending, then
    /// creation time ascending (oldest-highest-priority first).
    pub async fn list_waiting_sessions(&self) -> Result<Vec<Session>> {
        self.store.find_waiting().await
    }

    /// Lists all sessions assigned to the given expert.
    pub async fn list_expert_sessions(&self, expert_id: &str) -> Result<Vec<Session>> {
        self.store.find_by_expert(expert_id).await
    }

    /// Assigns an expert to a waiting session.
    ///
    /// Transitions `Waiting → InProgress`, stamps `started_at`, computes
    /// `response_time_minutes` once, and emits a system message naming the
    /// expert. The write is conditional on the session still being
    /// `Waiting`, which makes assignment exactly-once under races.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` if the session is not `Waiting`
    /// - `Conflict` if a concurrent assignment won the race
    pub async fn assign_expert(&self, session_id: &str, expert_id: &str) -> Result<Session> {
        let mut session = self
            .store
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| HotlineError::not_found("Session", session_id))?;

        let prior = session.status;
        session.assign(expert_id, Utc::now())?;
        self.store.update_if_status(&session, prior).await?;

        self.thread
            .post_system(&session, format!("Expert {} joined the session.", expert_id))
            .await?;

        tracing::info!(
            "[SessionEngine] Assigned expert {} to session {} (response time: {} min)",
            expert_id,
            session_id,
            session.response_time_minutes.unwrap_or(0)
        );

        Ok(session)
    }

    /// Posts a message to a session's thread on behalf of a participant.
    ///
    /// Messages may be posted in any session status, including `Closed`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `AccessDenied` if the sender is neither requester nor expert
    pub async fn send_message(
        &self,
        session_id: &str,
        sender_id: &str,
        content: &str,
        message_type: MessageType,
        code_snippet: Option<String>,
        code_language: Option<String>,
    ) -> Result<Message> {
        let session = self.get_session(session_id, sender_id).await?;

        self.thread
            .post(
                &session,
                sender_id,
                content,
                message_type,
                code_snippet,
                code_language,
            )
            .await
    }

    /// Returns a session's thread, authorized via the participant rule.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `AccessDenied` if the caller is neither requester nor expert
    pub async fn list_session_messages(
        &self,
        session_id: &str,
        requesting_user_id: &str,
    ) -> Result<Vec<Message>> {
        self.get_session(session_id, requesting_user_id).await?;
        self.thread.thread(session_id).await
    }

    /// Records a resolution on behalf of the assigned expert.
    ///
    /// Transitions the session to `Resolved`, stamps `resolved_at` and
    /// computes `resolution_time_minutes` from `created_at`. There is no
    /// status precondition; authorization on the assigned expert is what
    /// keeps never-assigned sessions out of reach.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `AccessDenied` if `expert_id` is not the assigned expert
    /// - `Conflict` if a concurrent transition won the race
    pub async fn mark_resolved(
        &self,
        session_id: &str,
        expert_id: &str,
        resolution: &str,
    ) -> Result<Session> {
        let mut session = self
            .store
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| HotlineError::not_found("Session", session_id))?;

        if session.expert_id.as_deref() != Some(expert_id) {
            return Err(HotlineError::access_denied(format!(
                "user '{}' is not the assigned expert of session '{}'",
                expert_id, session_id
            )));
        }

        let prior = session.status;
        session.resolve(resolution, Utc::now());
        self.store.update_if_status(&session, prior).await?;

        self.thread
            .post_system(&session, "Session marked as resolved by the expert.")
            .await?;

        tracing::info!(
            "[SessionEngine] Session {} resolved by {} ({} min)",
            session_id,
            expert_id,
            session.resolution_time_minutes.unwrap_or(0)
        );

        Ok(session)
    }

    /// Closes a session on behalf of its owner. Allowed from any status.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `AccessDenied` if the caller does not own the session
    /// - `Conflict` if a concurrent transition won the race
    pub async fn close_session(&self, session_id: &str, requester_id: &str) -> Result<Session> {
        let mut session = self
            .store
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| HotlineError::not_found("Session", session_id))?;

        if session.requester_id != requester_id {
            return Err(HotlineError::access_denied(format!(
                "user '{}' does not own session '{}'",
                requester_id, session_id
            )));
        }

        let prior = session.status;
        session.close();
        self.store.update_if_status(&session, prior).await?;

        self.thread
            .post_system(&session, "Session closed by the requester.")
            .await?;

        tracing::info!("[SessionEngine] Session {} closed", session_id);

        Ok(session)
    }

    /// Stores a satisfaction rating and optional feedback. No transition.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `AccessDenied` if the caller does not own the session
    /// - `InvalidState` if the session is not `Resolved` or `Closed`
    /// - `InvalidInput` if `rating` is outside [1,5]
    pub async fn rate_satisfaction(
        &self,
        session_id: &str,
        requester_id: &str,
        rating: u8,
        feedback: Option<String>,
    ) -> Result<Session> {
        let mut session = self
            .store
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| HotlineError::not_found("Session", session_id))?;

        if session.requester_id != requester_id {
            return Err(HotlineError::access_denied(format!(
                "user '{}' does not own session '{}'",
                requester_id, session_id
            )));
        }

        let prior = session.status;
        session.rate(rating, feedback)?;
        self.store.update_if_status(&session, prior).await?;

        Ok(session)
    }

    /// Marks a message as read on behalf of a participant.
    ///
    /// Stamping is idempotent: a message already read keeps its original
    /// `read_at`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session or message does not exist
    /// - `AccessDenied` if the caller is not a participant
    pub async fn mark_message_read(
        &self,
        session_id: &str,
        message_id: &str,
        reader_id: &str,
    ) -> Result<Message> {
        self.get_session(session_id, reader_id).await?;

        let mut message = self.find_message(session_id, message_id).await?;
        if message.read_at.is_none() {
            message.read_at = Some(Utc::now());
            self.store.update_message(&message).await?;
        }

        Ok(message)
    }

    /// Accepts an expert's solution message on behalf of the session owner.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session or message does not exist
    /// - `AccessDenied` if the caller does not own the session
    /// - `InvalidInput` if the message is not flagged as an expert solution
    pub async fn accept_solution(
        &self,
        session_id: &str,
        message_id: &str,
        requester_id: &str,
    ) -> Result<Message> {
        let session = self.get_session(session_id, requester_id).await?;
        if session.requester_id != requester_id {
            return Err(HotlineError::access_denied(format!(
                "user '{}' does not own session '{}'",
                requester_id, session_id
            )));
        }

        let mut message = self.find_message(session_id, message_id).await?;
        if !message.is_expert_solution {
            return Err(HotlineError::invalid_input(format!(
                "message '{}' is not an expert solution",
                message_id
            )));
        }

        if !message.solution_accepted {
            message.solution_accepted = true;
            message.solution_accepted_at = Some(Utc::now());
            self.store.update_message(&message).await?;
        }

        Ok(message)
    }

    async fn find_message(&self, session_id: &str, message_id: &str) -> Result<Message> {
        self.store
            .find_messages_by_session(session_id)
            .await?
            .into_iter()
            .find(|m| m.id == message_id)
            .ok_or_else(|| HotlineError::not_found("Message", message_id))
    }
}
