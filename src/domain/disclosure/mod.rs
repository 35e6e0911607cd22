//! Progressive disclosure - rule set, evaluator, and recommendations.
//!
//! Fields are revealed incrementally based on prior input, confidence,
//! and user expertise rather than showing the whole form at once.

mod context;
mod evaluator;
mod recommend;
mod rules;

pub use context::{
    is_basic_field, suggested_order, DisclosureContext, UncertaintyFlag, UncertaintySource,
    BASIC_FIELDS, CANONICAL_FIELD_ORDER, UNORDERED,
};
pub use evaluator::{DisclosureEvaluator, FieldDisclosureState};
pub use recommend::{
    FieldRecommendation, RecommendationGenerator, DEFAULT_RECOMMENDATION_LIMIT,
};
pub use rules::{
    ConditionOperator, DisclosureCondition, DisclosureRule, FieldTarget, CANONICAL_RULES,
};
