//! Field identifier and field value types.
//!
//! `FieldValue` is a tagged union so every consumer can pattern-match
//! exhaustively instead of duck-typing on loosely shaped payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a form field, e.g. `title` or `targetAmount`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Creates a field id.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the field name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the name is blank.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for FieldId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for FieldId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single form field's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Free text input.
    Text(String),
    /// Numeric input (amounts, counts).
    Number(f64),
    /// Boolean toggle.
    Flag(bool),
    /// Explicitly cleared / never filled.
    Empty,
}

impl FieldValue {
    /// Returns true if the value counts as "filled in": defined, non-null,
    /// and for text, non-empty after trimming.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.trim().is_empty(),
            FieldValue::Number(_) | FieldValue::Flag(_) => true,
            FieldValue::Empty => false,
        }
    }

    /// Returns the numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text value, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Case-insensitive substring test; false for non-text values.
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            FieldValue::Text(s) => s.to_lowercase().contains(&needle.to_lowercase()),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Empty => write!(f, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_id_from_str_keeps_name() {
        let id = FieldId::from("targetAmount");
        assert_eq!(id.as_str(), "targetAmount");
        assert!(!id.is_empty());
    }

    #[test]
    fn field_id_blank_is_empty() {
        assert!(FieldId::from("   ").is_empty());
        assert!(FieldId::from("").is_empty());
    }

    #[test]
    fn text_presence_requires_non_blank_content() {
        assert!(FieldValue::Text("Emergency Fund".into()).is_present());
        assert!(!FieldValue::Text("   ".into()).is_present());
        assert!(!FieldValue::Empty.is_present());
    }

    #[test]
    fn numbers_and_flags_are_always_present() {
        assert!(FieldValue::Number(0.0).is_present());
        assert!(FieldValue::Flag(false).is_present());
    }

    #[test]
    fn as_number_only_for_numbers() {
        assert_eq!(FieldValue::Number(15000.0).as_number(), Some(15000.0));
        assert_eq!(FieldValue::Text("15000".into()).as_number(), None);
    }

    #[test]
    fn contains_text_is_case_insensitive() {
        let value = FieldValue::Text("Graduate Scholarship".into());
        assert!(value.contains_text("scholar"));
        assert!(value.contains_text("GRADUATE"));
        assert!(!value.contains_text("loan"));
    }

    #[test]
    fn contains_text_false_for_non_text() {
        assert!(!FieldValue::Number(42.0).contains_text("42"));
        assert!(!FieldValue::Empty.contains_text(""));
    }

    #[test]
    fn field_value_serializes_tagged() {
        let json = serde_json::to_string(&FieldValue::Number(500.0)).unwrap();
        assert!(json.contains("\"kind\":\"number\""));
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FieldValue::Number(500.0));
    }
}
