//! Hotline infrastructure.
//!
//! Implementations of the core's collaborator traits for single-process
//! embedders and the test harness: an in-memory session store and a
//! catalog-backed quota gate.

pub mod quota;
pub mod store;

pub use quota::{CatalogQuotaGate, TierCatalog};
pub use store::InMemorySessionStore;
