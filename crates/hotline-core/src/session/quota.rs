//! Quota gate trait and subscription tiers.
//!
//! The quota gate is an external collaborator: it answers whether a
//! requester may open a new session and what service tier they hold.

use super::model::Priority;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Subscription level of a requester.
///
/// Drives dispatch priority and the response-time commitment announced when
/// a session is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    Free,
    Startup,
    Scaleup,
    Enterprise,
    Vip,
}

impl SubscriptionTier {
    /// Every tier, for catalog completeness checks.
    pub const ALL: [SubscriptionTier; 5] = [
        Self::Free,
        Self::Startup,
        Self::Scaleup,
        Self::Enterprise,
        Self::Vip,
    ];

    /// Maps a tier to the dispatch priority of sessions it opens.
    ///
    /// The match is exhaustive on purpose: adding a tier fails to compile
    /// until it is mapped, so a new tier can never silently fall through
    /// to a default.
    pub fn session_priority(self) -> Priority {
        match self {
            Self::Vip | Self::Enterprise | Self::Scaleup => Priority::High,
            Self::Startup | Self::Free => Priority::Normal,
        }
    }
}

/// Features attached to a subscription tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanFeatures {
    /// Committed first-response time, in hours
    pub response_time_hours: u32,
    /// Sessions the plan allows per calendar month
    pub monthly_session_limit: u32,
}

/// A requester's subscription as reported by the quota gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// The tier the requester holds
    pub tier: SubscriptionTier,
    /// The tier's feature set
    pub features: PlanFeatures,
}

/// Category of usage recorded against a requester's allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageKind {
    /// One expert support session.
    ExpertSession,
}

/// External collaborator answering quota and subscription questions.
///
/// Consulted by the lifecycle engine on session creation; the engine never
/// retries on its behalf, failures surface synchronously to the caller.
#[async_trait]
pub trait QuotaGate: Send + Sync {
    /// Returns true if the user has remaining allowance for new sessions.
    async fn check_usage_limits(&self, user_id: &str) -> Result<bool>;

    /// Returns the user's subscription tier and features.
    async fn subscription(&self, user_id: &str) -> Result<Subscription>;

    /// Records one unit of usage against the user's allowance.
    async fn record_usage(&self, user_id: &str, kind: UsageKind) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_priority_tiers() {
        assert_eq!(SubscriptionTier::Vip.session_priority(), Priority::High);
        assert_eq!(
            SubscriptionTier::Enterprise.session_priority(),
            Priority::High
        );
        assert_eq!(
            SubscriptionTier::Scaleup.session_priority(),
            Priority::High
        );
    }

    #[test]
    fn test_normal_priority_tiers() {
        assert_eq!(
            SubscriptionTier::Startup.session_priority(),
            Priority::Normal
        );
        assert_eq!(SubscriptionTier::Free.session_priority(), Priority::Normal);
    }
}
