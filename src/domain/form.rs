//! The per-session form context aggregate.
//!
//! `AiFormContext` is what the route layer loads, passes through the
//! update pipeline, and saves back. Handlers never mutate a context in
//! place; they return a new one built from the old (`apply_field` and
//! friends are functional updates), so a caller holding the previous
//! context always has a usable fallback.

use serde::{Deserialize, Serialize};

use super::disclosure::{DisclosureContext, FieldRecommendation};
use super::foundation::{FieldId, FieldValue, SessionId, Timestamp, UserId};
use super::validation::ConflictDescriptor;

/// Working state of one user's goal form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiFormContext {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub disclosure: DisclosureContext,
    /// Fields currently revealed to the user.
    pub visible_fields: Vec<FieldId>,
    /// Suggested next fields from the last disclosure pass.
    pub recommendations: Vec<FieldRecommendation>,
    /// Conflicts detected by the last validation pass, resolved or not.
    pub conflicts: Vec<ConflictDescriptor>,
    /// Monotonic revision, bumped on every applied update.
    pub revision: u64,
    pub updated_at: Timestamp,
}

impl AiFormContext {
    /// Creates an empty context for a new session.
    pub fn new(user_id: UserId, session_id: SessionId) -> Self {
        Self {
            user_id,
            session_id,
            disclosure: DisclosureContext::new(),
            visible_fields: Vec::new(),
            recommendations: Vec::new(),
            conflicts: Vec::new(),
            revision: 0,
            updated_at: Timestamp::now(),
        }
    }

    /// Returns a new context with the field value merged in.
    ///
    /// Present values mark the field completed; clearing a field removes
    /// it from the completed set.
    pub fn apply_field(&self, field: FieldId, value: FieldValue) -> Self {
        let mut next = self.clone();
        if value.is_present() {
            next.disclosure.completed_fields.insert(field.clone());
        } else {
            next.disclosure.completed_fields.remove(&field);
        }
        next.disclosure.form_data.insert(field, value);
        next.revision += 1;
        next.updated_at = Timestamp::now();
        next
    }

    /// Conflicts the user has not yet dealt with.
    pub fn unresolved_conflicts(&self) -> impl Iterator<Item = &ConflictDescriptor> {
        self.conflicts.iter().filter(|c| !c.resolved)
    }

    /// Returns true if any conflict is still open.
    pub fn has_unresolved_conflicts(&self) -> bool {
        self.unresolved_conflicts().next().is_some()
    }
}
