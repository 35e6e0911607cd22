//! Domain layer: pure form-state decision logic.
//!
//! Nothing here performs IO. Side effects (validation services, task
//! execution, persistence, events) live behind the port traits and are
//! orchestrated by the application layer.

pub mod disclosure;
pub mod form;
pub mod foundation;
pub mod safety;
pub mod snapshot;
pub mod validation;
