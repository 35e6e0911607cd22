//! Next-field recommendations.
//!
//! A pure function of the context: walks the canonical field list, keeps
//! the visible, not-yet-completed fields, and returns the top N by
//! suggested order. Safe to call repeatedly.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Confidence, FieldId};

use super::context::{DisclosureContext, CANONICAL_FIELD_ORDER};
use super::evaluator::DisclosureEvaluator;

/// Default number of fields suggested to the user.
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;

/// One recommended next field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecommendation {
    pub field_id: FieldId,
    pub reason: String,
    pub confidence: Confidence,
    pub suggested_order: u8,
}

/// Produces ordered next-field recommendations from an evaluator.
#[derive(Debug)]
pub struct RecommendationGenerator<'a> {
    evaluator: &'a DisclosureEvaluator,
}

impl<'a> RecommendationGenerator<'a> {
    /// Creates a generator over the given evaluator.
    pub fn new(evaluator: &'a DisclosureEvaluator) -> Self {
        Self { evaluator }
    }

    /// Recommends up to `limit` next fields to show.
    pub fn recommend_next_fields(
        &self,
        ctx: &DisclosureContext,
        limit: usize,
    ) -> Vec<FieldRecommendation> {
        let mut recommendations: Vec<FieldRecommendation> = CANONICAL_FIELD_ORDER
            .iter()
            .filter(|field| !ctx.completed_fields.contains(*field))
            .filter_map(|field| {
                let state = self.evaluator.evaluate_field(field, ctx);
                state.is_visible.then(|| FieldRecommendation {
                    field_id: field.clone(),
                    reason: state.reason,
                    confidence: state.confidence,
                    suggested_order: state.suggested_order,
                })
            })
            .collect();

        // Stable sort: canonical iteration order is preserved for ties.
        recommendations.sort_by_key(|r| r.suggested_order);
        recommendations.truncate(limit);
        recommendations
    }
}
