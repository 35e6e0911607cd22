//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `FormValidator` - validation and conflict detection
//! - `TaskRunner` - execution of heavy operations under a timeout
//! - `ContextStore` - persistence of per-session form contexts
//! - `SessionGateway` - session identity and expertise lookup
//! - `EventPublisher` - publication of engine events

mod context_store;
mod event_publisher;
mod form_validator;
mod session_gateway;
mod task_runner;

pub use context_store::{ContextStore, ContextStoreError};
pub use event_publisher::{EngineEvent, EventPublisher, PublishError};
pub use form_validator::{FormValidator, ValidatorError};
pub use session_gateway::{SessionGateway, SessionGatewayError, SessionInfo};
pub use task_runner::{HeavyTask, HeavyTaskOutput, TaskError, TaskRunner};
