//! Session domain module.
//!
//! This module contains all session-related domain models, collaborator
//! interfaces, and lifecycle logic.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `SessionStatus`, `Priority`)
//! - `message`: Conversation message types (`Message`, `MessageSender`, `MessageType`)
//! - `repository`: Store trait for session and message persistence
//! - `quota`: Quota gate trait and subscription tiers
//! - `engine`: Session lifecycle engine (`SessionEngine`)
//! - `thread`: Message thread manager (`MessageThread`)
//! - `stats`: Aggregate statistics (`StatsAggregator`, `SessionStatistics`)

mod engine;
mod message;
mod model;
mod quota;
mod repository;
mod stats;
mod thread;

// Re-export public API
pub use engine::SessionEngine;
pub use message::{Message, MessageSender, MessageType};
pub use model::{NewSessionRequest, Priority, Session, SessionStatus, TechnicalContext};
pub use quota::{PlanFeatures, QuotaGate, Subscription, SubscriptionTier, UsageKind};
pub use repository::SessionStore;
pub use stats::{SessionStatistics, StatsAggregator};
pub use thread::MessageThread;
