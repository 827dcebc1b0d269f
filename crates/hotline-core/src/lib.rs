//! Hotline core domain.
//!
//! Transport-agnostic support-session service: lifecycle state machine,
//! priority dispatch, message threads and aggregate statistics. Persistence
//! and quota checks are consumed through the [`session::SessionStore`] and
//! [`session::QuotaGate`] collaborator traits; embedders provide the
//! transport and the storage backend.

pub mod error;
pub mod session;

// Re-export common error type
pub use error::{HotlineError, Result};
