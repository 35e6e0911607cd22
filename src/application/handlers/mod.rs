//! Application handlers - one per engine operation.

mod process_field_update;
mod resolve_conflict;
mod validate_form;

pub use process_field_update::{
    FieldUpdate, ProcessError, ProcessFieldUpdateHandler, ProcessFieldUpdateResult, UpdateSource,
};
pub use resolve_conflict::{ResolveConflictHandler, ResolveError};
pub use validate_form::{ValidateError, ValidateFormHandler};
