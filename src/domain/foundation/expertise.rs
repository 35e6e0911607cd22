//! User expertise level used by disclosure rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Self-reported or inferred expertise with financial planning forms.
///
/// Beginners get help text on every visible field; advanced users unlock
/// detail fields (funding sources, breakdowns) earlier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExpertiseLevel {
    /// Returns the wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertiseLevel::Beginner => "beginner",
            ExpertiseLevel::Intermediate => "intermediate",
            ExpertiseLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ExpertiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expertise_default_is_beginner() {
        assert_eq!(ExpertiseLevel::default(), ExpertiseLevel::Beginner);
    }

    #[test]
    fn expertise_serializes_snake_case() {
        let json = serde_json::to_string(&ExpertiseLevel::Advanced).unwrap();
        assert_eq!(json, "\"advanced\"");
    }

    #[test]
    fn expertise_displays_label() {
        assert_eq!(ExpertiseLevel::Intermediate.to_string(), "intermediate");
    }
}
