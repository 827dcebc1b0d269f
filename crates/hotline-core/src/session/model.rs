//! Session domain model.
//!
//! This module contains the core Session entity that represents one support
//! request from creation to closure in the application's domain layer.

use crate::error::{HotlineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a support session.
///
/// Allowed transitions: `Waiting → InProgress → Resolved → Closed`, plus a
/// direct `Waiting → Closed` path (the owner may cancel before assignment).
/// `Closed` is terminal and reachable by the owner from any prior status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Created, not yet picked up by an expert.
    Waiting,
    /// An expert is assigned and working on the request.
    InProgress,
    /// The assigned expert recorded a resolution.
    Resolved,
    /// Closed by the owner; terminal.
    Closed,
}

/// Dispatch-order hint for waiting sessions.
///
/// `Ord` follows urgency so the waiting queue can sort on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Waiting => "WAITING",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        };
        write!(f, "{}", s)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        };
        write!(f, "{}", s)
    }
}

/// Optional technical metadata attached to a session on creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalContext {
    /// Programming language the requester is working in
    pub language: Option<String>,
    /// Framework in use, if any
    pub framework: Option<String>,
    /// Error text pasted by the requester
    pub error_text: Option<String>,
    /// Code snippet illustrating the problem
    pub code_snippet: Option<String>,
}

/// Fields supplied by the requester when opening a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSessionRequest {
    /// Human-readable session title
    pub title: String,
    /// Free-text problem description
    pub description: String,
    /// Free-text tags for categorization
    pub tags: Vec<String>,
    /// Optional technical metadata
    pub technical: Option<TechnicalContext>,
}

/// Represents one support request from creation to closure.
///
/// Invariants maintained by the transition methods:
/// - `expert_id` is set if and only if status is `InProgress`, `Resolved`
///   or `Closed` after an assignment (it remains set after closing).
/// - `started_at` is stamped exactly at the `Waiting → InProgress`
///   transition; `resolved_at` exactly at the transition to `Resolved`.
/// - `response_time_minutes` and `resolution_time_minutes` are computed once
///   at their respective transitions and never recomputed.
/// - `satisfaction_rating`, if present, is an integer in [1,5] and is only
///   set while the status is `Resolved` or `Closed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Identifier of the user who opened the session
    pub requester_id: String,
    /// Identifier of the assigned expert, once assigned
    pub expert_id: Option<String>,
    /// Current lifecycle status
    pub status: SessionStatus,
    /// Dispatch priority derived from the requester's subscription tier
    pub priority: Priority,
    /// Human-readable session title
    pub title: String,
    /// Free-text problem description
    pub description: String,
    /// Free-text tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional technical metadata
    pub technical: Option<TechnicalContext>,
    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of the `Waiting → InProgress` transition
    pub started_at: Option<DateTime<Utc>>,
    /// Timestamp of the transition to `Resolved`
    pub resolved_at: Option<DateTime<Utc>>,
    /// `started_at - created_at`, rounded to the nearest minute
    pub response_time_minutes: Option<i64>,
    /// `resolved_at - created_at`, rounded to the nearest minute
    pub resolution_time_minutes: Option<i64>,
    /// Resolution text recorded by the expert
    pub resolution: Option<String>,
    /// Satisfaction rating in [1,5], set by the requester after resolution
    pub satisfaction_rating: Option<u8>,
    /// Free-text feedback accompanying the rating
    pub satisfaction_feedback: Option<String>,
}

/// Rounds a duration between two instants to the nearest whole minute.
fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let seconds = (to - from).num_seconds();
    // Round half away from zero; durations here are non-negative in practice.
    (seconds + 30).div_euclid(60)
}

impl Session {
    /// Creates a new session in `Waiting` status.
    ///
    /// # Arguments
    ///
    /// * `requester_id` - The user opening the session
    /// * `request` - Title, description, tags and technical context
    /// * `priority` - Priority derived from the requester's tier
    /// * `now` - Creation timestamp
    pub fn new(
        requester_id: impl Into<String>,
        request: NewSessionRequest,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            requester_id: requester_id.into(),
            expert_id: None,
            status: SessionStatus::Waiting,
            priority,
            title: request.title,
            description: request.description,
            tags: request.tags,
            technical: request.technical,
            created_at: now,
            started_at: None,
            resolved_at: None,
            response_time_minutes: None,
            resolution_time_minutes: None,
            resolution: None,
            satisfaction_rating: None,
            satisfaction_feedback: None,
        }
    }

    /// Returns true if `user_id` is the requester or the assigned expert.
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.expert_id.as_deref() == Some(user_id)
    }

    /// Assigns an expert and transitions `Waiting → InProgress`.
    ///
    /// Stamps `started_at` and computes `response_time_minutes` once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the session is not in `Waiting` status
    /// (no re-assignment, no assignment of an in-progress or terminal
    /// session). The session is left unmodified on error.
    pub fn assign(&mut self, expert_id: impl Into<String>, now: DateTime<Utc>) -> Result<()> {
        if self.status != SessionStatus::Waiting {
            return Err(HotlineError::invalid_state(format!(
                "cannot assign expert to session in {} status",
                self.status
            )));
        }

        self.expert_id = Some(expert_id.into());
        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);
        self.response_time_minutes = Some(minutes_between(self.created_at, now));

        Ok(())
    }

    /// Records a resolution and transitions to `Resolved`.
    ///
    /// Stamps `resolved_at` and computes `resolution_time_minutes` from
    /// `created_at`. There is deliberately no status guard here; the engine
    /// authorizes on the assigned expert, which makes this unreachable for
    /// sessions that were never assigned.
    pub fn resolve(&mut self, resolution: impl Into<String>, now: DateTime<Utc>) {
        self.status = SessionStatus::Resolved;
        self.resolved_at = Some(now);
        self.resolution_time_minutes = Some(minutes_between(self.created_at, now));
        self.resolution = Some(resolution.into());
    }

    /// Closes the session from any prior status. Terminal.
    pub fn close(&mut self) {
        self.status = SessionStatus::Closed;
    }

    /// Stores a satisfaction rating and optional feedback.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `rating` is outside [1,5]
    /// - `InvalidState` if the session is not `Resolved` or `Closed`
    pub fn rate(&mut self, rating: u8, feedback: Option<String>) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(HotlineError::invalid_input(format!(
                "satisfaction rating must be between 1 and 5, got {}",
                rating
            )));
        }
        if !matches!(
            self.status,
            SessionStatus::Resolved | SessionStatus::Closed
        ) {
            return Err(HotlineError::invalid_state(format!(
                "cannot rate a session in {} status",
                self.status
            )));
        }

        self.satisfaction_rating = Some(rating);
        self.satisfaction_feedback = feedback;

        Ok(())
    }
}
