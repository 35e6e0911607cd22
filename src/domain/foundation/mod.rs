//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the Scholar Compass domain.

mod confidence;
mod errors;
mod expertise;
mod field;
mod ids;
mod timestamp;

pub use confidence::Confidence;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use expertise::ExpertiseLevel;
pub use field::{FieldId, FieldValue};
pub use ids::{ConflictId, SessionId, SnapshotId, UserId};
pub use timestamp::Timestamp;
