//! In-memory persistence adapters.

mod context_store;

pub use context_store::InMemoryContextStore;
