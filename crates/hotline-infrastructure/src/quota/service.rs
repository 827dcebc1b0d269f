//! Catalog-backed quota gate.
//!
//! A `QuotaGate` implementation for single-process embedders: subscription
//! tiers come from an in-memory registry, allowances from a [`TierCatalog`],
//! and usage is counted per user in memory.

use super::catalog::TierCatalog;
use async_trait::async_trait;
use hotline_core::error::Result;
use hotline_core::session::{QuotaGate, Subscription, SubscriptionTier, UsageKind};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// [`QuotaGate`] backed by a [`TierCatalog`] and in-memory usage counters.
///
/// Users without a registered tier are treated as `Free`.
pub struct CatalogQuotaGate {
    catalog: TierCatalog,
    /// User ID → subscription tier
    tiers: RwLock<HashMap<String, SubscriptionTier>>,
    /// User ID → sessions opened in the current period
    usage: RwLock<HashMap<String, u32>>,
}

impl CatalogQuotaGate {
    /// Creates a gate over the given catalog with no registered users.
    pub fn new(catalog: TierCatalog) -> Self {
        Self {
            catalog,
            tiers: RwLock::new(HashMap::new()),
            usage: RwLock::new(HashMap::new()),
        }
    }

    /// Registers (or changes) a user's subscription tier.
    pub async fn register_tier(&self, user_id: &str, tier: SubscriptionTier) {
        let mut tiers = self.tiers.write().await;
        tiers.insert(user_id.to_string(), tier);
    }

    async fn tier_of(&self, user_id: &str) -> SubscriptionTier {
        let tiers = self.tiers.read().await;
        tiers.get(user_id).copied().unwrap_or(SubscriptionTier::Free)
    }
}

#[async_trait]
impl QuotaGate for CatalogQuotaGate {
    async fn check_usage_limits(&self, user_id: &str) -> Result<bool> {
        let tier = self.tier_of(user_id).await;
        let limit = self.catalog.features(tier).monthly_session_limit;

        let usage = self.usage.read().await;
        let used = usage.get(user_id).copied().unwrap_or(0);

        Ok(used < limit)
    }

    async fn subscription(&self, user_id: &str) -> Result<Subscription> {
        let tier = self.tier_of(user_id).await;
        Ok(Subscription {
            tier,
            features: self.catalog.features(tier).clone(),
        })
    }

    async fn record_usage(&self, user_id: &str, kind: UsageKind) -> Result<()> {
        let mut usage = self.usage.write().await;
        let count = usage.entry(user_id.to_string()).or_insert(0);
        *count += 1;

        tracing::debug!(
            "[CatalogQuotaGate] Recorded {:?} for {} (total: {})",
            kind,
            user_id,
            count
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unregistered_user_defaults_to_free() {
        let gate = CatalogQuotaGate::new(TierCatalog::default());

        let subscription = gate.subscription("nobody").await.unwrap();

        assert_eq!(subscription.tier, SubscriptionTier::Free);
    }

    #[tokio::test]
    async fn test_usage_exhausts_allowance() {
        let gate = CatalogQuotaGate::new(TierCatalog::default());
        gate.register_tier("user-1", SubscriptionTier::Free).await;

        // Free tier allows exactly one session per period.
        assert!(gate.check_usage_limits("user-1").await.unwrap());
        gate.record_usage("user-1", UsageKind::ExpertSession)
            .await
            .unwrap();
        assert!(!gate.check_usage_limits("user-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_tier_changes_features() {
        let gate = CatalogQuotaGate::new(TierCatalog::default());
        gate.register_tier("user-1", SubscriptionTier::Vip).await;

        let subscription = gate.subscription("user-1").await.unwrap();

        assert_eq!(subscription.tier, SubscriptionTier::Vip);
        assert_eq!(subscription.features.response_time_hours, 1);
    }
}
