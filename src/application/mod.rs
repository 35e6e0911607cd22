//! Application layer - engines, handlers, and the session registry.
//!
//! This layer wires the pure domain logic to the ports: it loads and
//! saves contexts, delegates heavy work to task runners, and executes
//! the actions the safety monitor demands.

mod engine;
pub mod handlers;
mod registry;

pub use engine::{heuristic_confidence, summarize, EngineError, FormEngine, SafetyReport};
pub use registry::EngineRegistry;
