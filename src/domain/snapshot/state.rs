//! Checksummed form-state snapshots.
//!
//! A snapshot captures deep copies of the form data, the AI-inferred
//! state, and the progressive-disclosure state at one point in time. The
//! checksum is SHA-256 over the JSON serialization of those three
//! captures; all keyed state uses `BTreeMap`, so serialization order (and
//! therefore the checksum) is deterministic. The goal is corruption
//! detection, not tamper resistance.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::disclosure::DisclosureContext;
use crate::domain::foundation::{
    Confidence, ExpertiseLevel, FieldId, FieldValue, SessionId, SnapshotId, Timestamp,
};

/// Errors raised while capturing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to serialize snapshot state: {0}")]
    Serialization(String),
}

/// Summary of the AI-inferred state at capture time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiStateSummary {
    pub phase: String,
    pub completed_sections: Vec<String>,
    pub confidence_scores: BTreeMap<FieldId, Confidence>,
    pub inferred_data: BTreeMap<FieldId, FieldValue>,
}

impl AiStateSummary {
    /// Mean of the captured confidence scores; `None` when none were
    /// captured (such a snapshot never qualifies as a rollback target).
    pub fn mean_confidence(&self) -> Option<Confidence> {
        Confidence::mean(self.confidence_scores.values())
    }
}

/// Summary of the progressive-disclosure state at capture time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveStateSummary {
    pub context: DisclosureContext,
    pub visible_fields: Vec<FieldId>,
    pub expertise: ExpertiseLevel,
}

/// An immutable, checksummed capture of form + AI + disclosure state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormStateSnapshot {
    pub id: SnapshotId,
    pub created_at: Timestamp,
    pub session_id: SessionId,
    pub form_data: BTreeMap<FieldId, FieldValue>,
    pub ai_state: AiStateSummary,
    pub progressive_state: ProgressiveStateSummary,
    pub checksum: String,
}

impl FormStateSnapshot {
    /// Captures a snapshot, cloning all inputs so later mutation of the
    /// originals cannot bleed into the stored copy.
    pub fn capture(
        id: SnapshotId,
        session_id: SessionId,
        form_data: &BTreeMap<FieldId, FieldValue>,
        ai_state: &AiStateSummary,
        progressive_state: &ProgressiveStateSummary,
    ) -> Result<Self, SnapshotError> {
        let checksum = compute_checksum(form_data, ai_state, progressive_state)?;
        Ok(Self {
            id,
            created_at: Timestamp::now(),
            session_id,
            form_data: form_data.clone(),
            ai_state: ai_state.clone(),
            progressive_state: progressive_state.clone(),
            checksum,
        })
    }

    /// Recomputes the checksum from the stored captures and compares it
    /// to the recorded one. A mismatch means corruption.
    pub fn verify_integrity(&self) -> bool {
        compute_checksum(&self.form_data, &self.ai_state, &self.progressive_state)
            .map(|checksum| checksum == self.checksum)
            .unwrap_or(false)
    }

    /// Mean confidence of the captured AI state.
    pub fn mean_confidence(&self) -> Option<Confidence> {
        self.ai_state.mean_confidence()
    }
}

/// SHA-256 over the JSON serialization of the three captured structures.
pub fn compute_checksum(
    form_data: &BTreeMap<FieldId, FieldValue>,
    ai_state: &AiStateSummary,
    progressive_state: &ProgressiveStateSummary,
) -> Result<String, SnapshotError> {
    let bytes = serde_json::to_vec(&(form_data, ai_state, progressive_state))
        .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> BTreeMap<FieldId, FieldValue> {
        let mut form = BTreeMap::new();
        form.insert(
            FieldId::from("title"),
            FieldValue::Text("Emergency Fund".into()),
        );
        form.insert(FieldId::from("targetAmount"), FieldValue::Number(5_000.0));
        form
    }

    fn sample_ai_state() -> AiStateSummary {
        let mut state = AiStateSummary {
            phase: "refinement".into(),
            completed_sections: vec!["basics".into()],
            ..Default::default()
        };
        state
            .confidence_scores
            .insert(FieldId::from("title"), Confidence::new(0.9));
        state
    }

    #[test]
    fn capture_stores_deep_copies() {
        let mut form = sample_form();
        let snapshot = FormStateSnapshot::capture(
            SnapshotId::generate(),
            SessionId::new(),
            &form,
            &sample_ai_state(),
            &ProgressiveStateSummary::default(),
        )
        .unwrap();

        // Mutating the original after capture must not affect the snapshot.
        form.insert(FieldId::from("title"), FieldValue::Text("Changed".into()));

        assert_eq!(
            snapshot.form_data.get(&FieldId::from("title")),
            Some(&FieldValue::Text("Emergency Fund".into()))
        );
    }

    #[test]
    fn checksum_is_stable_for_identical_content() {
        let form = sample_form();
        let ai = sample_ai_state();
        let progressive = ProgressiveStateSummary::default();

        let first = compute_checksum(&form, &ai, &progressive).unwrap();
        let second = compute_checksum(&form, &ai, &progressive).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn checksum_changes_when_a_field_changes() {
        let form = sample_form();
        let ai = sample_ai_state();
        let progressive = ProgressiveStateSummary::default();
        let baseline = compute_checksum(&form, &ai, &progressive).unwrap();

        let mut altered = form.clone();
        altered.insert(FieldId::from("targetAmount"), FieldValue::Number(5_001.0));

        assert_ne!(
            compute_checksum(&altered, &ai, &progressive).unwrap(),
            baseline
        );
    }

    #[test]
    fn fresh_snapshot_verifies() {
        let snapshot = FormStateSnapshot::capture(
            SnapshotId::generate(),
            SessionId::new(),
            &sample_form(),
            &sample_ai_state(),
            &ProgressiveStateSummary::default(),
        )
        .unwrap();
        assert!(snapshot.verify_integrity());
    }

    #[test]
    fn tampered_snapshot_fails_verification() {
        let mut snapshot = FormStateSnapshot::capture(
            SnapshotId::generate(),
            SessionId::new(),
            &sample_form(),
            &sample_ai_state(),
            &ProgressiveStateSummary::default(),
        )
        .unwrap();

        snapshot
            .form_data
            .insert(FieldId::from("targetAmount"), FieldValue::Number(999.0));

        assert!(!snapshot.verify_integrity());
    }

    #[test]
    fn mean_confidence_empty_scores_is_none() {
        let state = AiStateSummary::default();
        assert_eq!(state.mean_confidence(), None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn form_with(amount: f64, title: &str) -> BTreeMap<FieldId, FieldValue> {
            let mut form = BTreeMap::new();
            form.insert(FieldId::from("title"), FieldValue::Text(title.into()));
            form.insert(FieldId::from("targetAmount"), FieldValue::Number(amount));
            form
        }

        proptest! {
            #[test]
            fn checksum_is_deterministic(amount in 0.0f64..1_000_000.0, title in "[a-zA-Z ]{0,24}") {
                let form = form_with(amount, &title);
                let ai = AiStateSummary::default();
                let progressive = ProgressiveStateSummary::default();
                prop_assert_eq!(
                    compute_checksum(&form, &ai, &progressive).unwrap(),
                    compute_checksum(&form, &ai, &progressive).unwrap()
                );
            }

            #[test]
            fn checksum_detects_amount_changes(
                amount in 0.0f64..1_000_000.0,
                delta in 0.001f64..1_000.0,
            ) {
                let ai = AiStateSummary::default();
                let progressive = ProgressiveStateSummary::default();
                let a = compute_checksum(&form_with(amount, "Goal"), &ai, &progressive).unwrap();
                let b = compute_checksum(&form_with(amount + delta, "Goal"), &ai, &progressive).unwrap();
                prop_assert_ne!(a, b);
            }
        }
    }
}
