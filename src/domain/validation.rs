//! Validation and conflict records exchanged with the validator port.
//!
//! These are explicit tagged records replacing the loosely shaped payloads
//! the original validation pipeline passed around.

use serde::{Deserialize, Serialize};

use super::foundation::{Confidence, ConflictId, FieldId, FieldValue};

/// A single validation finding attached to a field (or the whole form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// The offending field; `None` for form-level findings.
    pub field: Option<FieldId>,
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue scoped to a field.
    pub fn for_field(field: impl Into<FieldId>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a form-level issue.
    pub fn form_level(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// A non-blocking improvement hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub field: Option<FieldId>,
    pub message: String,
}

/// Result of a validation pass over the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub suggestions: Vec<Suggestion>,
    pub overall_confidence: Confidence,
}

impl ValidationOutcome {
    /// An outcome with no findings and full confidence.
    pub fn clean() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            overall_confidence: Confidence::FULL,
        }
    }

    /// Returns true if no blocking errors were found.
    pub fn is_passing(&self) -> bool {
        self.errors.is_empty()
    }
}

/// How serious a detected conflict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

/// A contradiction between two or more field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictDescriptor {
    pub id: ConflictId,
    pub fields: Vec<FieldId>,
    pub description: String,
    pub severity: ConflictSeverity,
    pub resolved: bool,
}

impl ConflictDescriptor {
    /// Creates an unresolved conflict.
    pub fn new(
        id: ConflictId,
        fields: Vec<FieldId>,
        description: impl Into<String>,
        severity: ConflictSeverity,
    ) -> Self {
        Self {
            id,
            fields,
            description: description.into(),
            severity,
            resolved: false,
        }
    }

    /// Returns a resolved copy of this conflict.
    pub fn resolve(mut self) -> Self {
        self.resolved = true;
        self
    }
}

/// The user's decision when resolving a conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictResolution {
    /// Keep the current values and mark the conflict handled.
    KeepCurrent,
    /// Replace one field's value with the user's choice.
    ReplaceValue { field: FieldId, value: FieldValue },
    /// Dismiss the conflict as a false positive.
    Dismiss,
}
