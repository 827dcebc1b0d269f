//! Quota gate implementation and tier catalog.

mod catalog;
mod service;

pub use catalog::TierCatalog;
pub use service::CatalogQuotaGate;
