//! Event publisher adapters.

mod in_memory;
mod tracing;

pub use self::tracing::TracingEventPublisher;
pub use in_memory::InMemoryEventPublisher;
