//! Error types for the Hotline service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole Hotline domain.
///
/// Every failed precondition check in the lifecycle engine maps to exactly
/// one of these variants; the transport layer embedding the engine is
/// responsible for translating them into protocol codes.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HotlineError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Caller is not an authorized participant for the operation
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Operation attempted from a session status that forbids it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Structurally invalid argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requester has exhausted their plan's usage allowance
    #[error("Quota exceeded for user '{user_id}'")]
    QuotaExceeded { user_id: String },

    /// A conditional write lost a race (expected status no longer held)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HotlineError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an AccessDenied error
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a QuotaExceeded error
    pub fn quota_exceeded(user_id: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            user_id: user_id.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an AccessDenied error
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied(_))
    }

    /// Check if this is an InvalidState error
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Check if this is an InvalidInput error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this is a QuotaExceeded error
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    /// Check if this is a Conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Convenient Result type alias using HotlineError
pub type Result<T> = std::result::Result<T, HotlineError>;
