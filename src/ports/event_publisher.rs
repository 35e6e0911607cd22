//! Event Publisher Port - Interface for publishing engine events.
//!
//! Events are observational: the update pipeline never blocks on a
//! subscriber and publish failures never fail the operation that raised
//! them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConflictId, FieldId, SessionId, SnapshotId};
use crate::domain::safety::{SafetyAction, TriggerKind};

/// Events raised by the form engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    FieldUpdated {
        session_id: SessionId,
        field_id: FieldId,
        revision: u64,
    },
    SnapshotCreated {
        session_id: SessionId,
        snapshot_id: SnapshotId,
    },
    RollbackPerformed {
        session_id: SessionId,
        snapshot_id: SnapshotId,
    },
    SafetyTriggerFired {
        session_id: SessionId,
        kind: TriggerKind,
        action: SafetyAction,
    },
    EmergencyActivated {
        session_id: SessionId,
    },
    ConflictDetected {
        session_id: SessionId,
        conflict_id: ConflictId,
    },
    ConflictResolved {
        session_id: SessionId,
        conflict_id: ConflictId,
    },
    DegradedModeEntered {
        session_id: SessionId,
        reason: String,
    },
    SessionReset {
        session_id: SessionId,
    },
}

impl EngineEvent {
    /// The session this event belongs to.
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::FieldUpdated { session_id, .. }
            | Self::SnapshotCreated { session_id, .. }
            | Self::RollbackPerformed { session_id, .. }
            | Self::SafetyTriggerFired { session_id, .. }
            | Self::EmergencyActivated { session_id }
            | Self::ConflictDetected { session_id, .. }
            | Self::ConflictResolved { session_id, .. }
            | Self::DegradedModeEntered { session_id, .. }
            | Self::SessionReset { session_id } => *session_id,
        }
    }
}

/// Errors that can occur during event publication.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to publish event: {0}")]
    Failed(String),
}

/// Port for publishing engine events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EngineEvent) -> Result<(), PublishError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_expose_their_session() {
        let session_id = SessionId::new();
        let event = EngineEvent::EmergencyActivated { session_id };
        assert_eq!(event.session_id(), session_id);
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let event = EngineEvent::SessionReset {
            session_id: SessionId::new(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"session_reset\""));
    }
}
