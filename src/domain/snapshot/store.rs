//! Session-scoped snapshot store.
//!
//! Holds the last N snapshots for one session, strict FIFO by insertion
//! order. Each store belongs to exactly one session; sharing an instance
//! across sessions is a defect.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use crate::domain::foundation::{FieldId, FieldValue, SessionId, SnapshotId, Timestamp};

use super::state::{
    AiStateSummary, FormStateSnapshot, ProgressiveStateSummary, SnapshotError,
};

/// Default number of snapshots retained per session.
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 10;

/// Minimum mean confidence a snapshot needs to qualify as a rollback
/// target. Rolling back to another bad state helps nobody.
pub const ROLLBACK_CONFIDENCE_FLOOR: f64 = 0.7;

/// Outcome of looking up a snapshot for rollback.
///
/// The public surface reports both missing and corrupt snapshots as
/// `None`; this internal distinction lets the safety monitor count
/// corruption separately.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotLookup {
    Restored(Box<FormStateSnapshot>),
    NotFound,
    Corrupted,
}

/// Listing entry for stored snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    pub id: SnapshotId,
    pub created_at: Timestamp,
    pub checksum: String,
}

/// In-memory, session-scoped collection of checksummed snapshots.
#[derive(Debug)]
pub struct SnapshotStore {
    session_id: SessionId,
    capacity: usize,
    rollback_floor: f64,
    snapshots: VecDeque<FormStateSnapshot>,
}

impl SnapshotStore {
    /// Creates a store for one session with the default capacity.
    pub fn new(session_id: SessionId) -> Self {
        Self::with_capacity(session_id, DEFAULT_SNAPSHOT_CAPACITY, ROLLBACK_CONFIDENCE_FLOOR)
    }

    /// Creates a store with explicit capacity and rollback floor.
    pub fn with_capacity(session_id: SessionId, capacity: usize, rollback_floor: f64) -> Self {
        Self {
            session_id,
            capacity: capacity.max(1),
            rollback_floor,
            snapshots: VecDeque::new(),
        }
    }

    /// The session this store belongs to.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Captures and stores a snapshot, evicting the oldest entry once
    /// capacity is exceeded. Re-using a label replaces that snapshot.
    pub fn create_snapshot(
        &mut self,
        form_data: &BTreeMap<FieldId, FieldValue>,
        ai_state: &AiStateSummary,
        progressive_state: &ProgressiveStateSummary,
        label: Option<&str>,
    ) -> Result<SnapshotId, SnapshotError> {
        let id = match label {
            Some(label) => SnapshotId::from_label(label),
            None => SnapshotId::generate(),
        };

        let snapshot = FormStateSnapshot::capture(
            id.clone(),
            self.session_id,
            form_data,
            ai_state,
            progressive_state,
        )?;

        self.snapshots.retain(|s| s.id != id);
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }

        Ok(id)
    }

    /// Looks up a snapshot by id, verifying its checksum on read.
    pub fn lookup(&self, id: &SnapshotId) -> SnapshotLookup {
        match self.snapshots.iter().find(|s| &s.id == id) {
            None => SnapshotLookup::NotFound,
            Some(snapshot) if snapshot.verify_integrity() => {
                SnapshotLookup::Restored(Box::new(snapshot.clone()))
            }
            Some(_) => SnapshotLookup::Corrupted,
        }
    }

    /// Returns the snapshot to roll back to, or `None` if it is missing
    /// or fails its checksum. A corrupt snapshot is never returned.
    pub fn rollback_to_snapshot(&self, id: &SnapshotId) -> Option<FormStateSnapshot> {
        match self.lookup(id) {
            SnapshotLookup::Restored(snapshot) => Some(*snapshot),
            SnapshotLookup::NotFound | SnapshotLookup::Corrupted => None,
        }
    }

    /// Scans all stored snapshots and returns the one with the highest
    /// mean confidence above the floor. `None` when nothing qualifies:
    /// rolling back to a bad state is worse than not rolling back.
    pub fn rollback_to_last_good_state(&self) -> Option<FormStateSnapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.verify_integrity())
            .filter_map(|s| s.mean_confidence().map(|c| (s, c.value())))
            .filter(|(_, mean)| *mean > self.rollback_floor)
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(s, _)| s.clone())
    }

    /// Lists stored snapshots in insertion order.
    pub fn snapshots(&self) -> Vec<SnapshotInfo> {
        self.snapshots
            .iter()
            .map(|s| SnapshotInfo {
                id: s.id.clone(),
                created_at: s.created_at,
                checksum: s.checksum.clone(),
            })
            .collect()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when nothing has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drops all stored snapshots.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    #[cfg(test)]
    pub(crate) fn corrupt_for_test(&mut self, id: &SnapshotId) {
        if let Some(snapshot) = self.snapshots.iter_mut().find(|s| &s.id == id) {
            snapshot
                .form_data
                .insert(FieldId::from("title"), FieldValue::Text("tampered".into()));
        }
    }
}
