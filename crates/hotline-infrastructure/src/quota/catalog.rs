//! Tier catalog.
//!
//! Per-tier feature definitions (response-time commitments and monthly
//! session allowances), loadable from a TOML file with a built-in default.
//! The catalog is validated to cover every tier on load, so lookups are
//! infallible.

use hotline_core::error::{HotlineError, Result};
use hotline_core::session::{PlanFeatures, SubscriptionTier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// On-disk shape of the catalog file.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    tiers: HashMap<SubscriptionTier, PlanFeatures>,
}

/// Feature catalog covering every subscription tier.
#[derive(Debug, Clone)]
pub struct TierCatalog {
    tiers: HashMap<SubscriptionTier, PlanFeatures>,
}

impl TierCatalog {
    /// Loads a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// - `DataAccess` if the file cannot be read or parsed
    /// - `InvalidInput` if the file does not define every tier
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HotlineError::data_access(format!(
                "failed to read tier catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        let file: CatalogFile = toml::from_str(&content).map_err(|e| {
            HotlineError::data_access(format!(
                "failed to parse tier catalog {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_tiers(file.tiers)
    }

    /// Builds a catalog from an explicit tier map, validating completeness.
    pub fn from_tiers(tiers: HashMap<SubscriptionTier, PlanFeatures>) -> Result<Self> {
        for tier in SubscriptionTier::ALL {
            if !tiers.contains_key(&tier) {
                return Err(HotlineError::invalid_input(format!(
                    "tier catalog is missing a definition for {:?}",
                    tier
                )));
            }
        }

        Ok(Self { tiers })
    }

    /// Returns the features for a tier.
    ///
    /// Total by construction: the catalog is validated to cover every tier.
    pub fn features(&self, tier: SubscriptionTier) -> &PlanFeatures {
        &self.tiers[&tier]
    }
}

impl Default for TierCatalog {
    /// Built-in catalog used when no file is configured.
    fn default() -> Self {
        let features = |hours, limit| PlanFeatures {
            response_time_hours: hours,
            monthly_session_limit: limit,
        };
        let tiers = HashMap::from([
            (SubscriptionTier::Free, features(48, 1)),
            (SubscriptionTier::Startup, features(24, 3)),
            (SubscriptionTier::Scaleup, features(8, 10)),
            (SubscriptionTier::Enterprise, features(4, 30)),
            (SubscriptionTier::Vip, features(1, 100)),
        ]);
        Self { tiers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_catalog_covers_all_tiers() {
        let catalog = TierCatalog::default();
        for tier in SubscriptionTier::ALL {
            assert!(catalog.features(tier).monthly_session_limit > 0);
        }
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[tiers.FREE]
response_time_hours = 72
monthly_session_limit = 1

[tiers.STARTUP]
response_time_hours = 24
monthly_session_limit = 5

[tiers.SCALEUP]
response_time_hours = 8
monthly_session_limit = 15

[tiers.ENTERPRISE]
response_time_hours = 4
monthly_session_limit = 50

[tiers.VIP]
response_time_hours = 1
monthly_session_limit = 200
"#
        )
        .unwrap();

        let catalog = TierCatalog::load_from(file.path()).unwrap();

        assert_eq!(catalog.features(SubscriptionTier::Free).response_time_hours, 72);
        assert_eq!(
            catalog.features(SubscriptionTier::Vip).monthly_session_limit,
            200
        );
    }

    #[test]
    fn test_incomplete_catalog_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[tiers.FREE]
response_time_hours = 72
monthly_session_limit = 1
"#
        )
        .unwrap();

        let err = TierCatalog::load_from(file.path()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_unparseable_catalog_is_data_access_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not toml at all [").unwrap();

        let err = TierCatalog::load_from(file.path()).unwrap_err();
        assert!(matches!(err, HotlineError::DataAccess(_)));
    }
}
