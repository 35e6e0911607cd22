//! Snapshot and rollback safety layer.
//!
//! Checksummed captures of form + AI + disclosure state, stored per
//! session with bounded history, so the engine can roll back to a known
//! good state when AI assistance goes sideways.

mod state;
mod store;

pub use state::{
    compute_checksum, AiStateSummary, FormStateSnapshot, ProgressiveStateSummary, SnapshotError,
};
pub use store::{
    SnapshotInfo, SnapshotLookup, SnapshotStore, DEFAULT_SNAPSHOT_CAPACITY,
    ROLLBACK_CONFIDENCE_FLOOR,
};
