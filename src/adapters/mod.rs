//! Adapters - Implementations of the ports.
//!
//! - `validation` - rule-based form validator
//! - `tasks` - inline and spawned task runners
//! - `memory` - in-memory context persistence
//! - `session` - in-memory session gateway
//! - `events` - in-memory and tracing event publishers

pub mod events;
pub mod memory;
pub mod session;
pub mod tasks;
pub mod validation;
