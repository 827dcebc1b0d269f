//! Storage implementations of the core's `SessionStore` trait.

mod memory;

pub use memory::InMemorySessionStore;
