//! Board state store: the single owner of the board partition.

use crate::engine::MovePlan;
use crate::types::{Assignment, AssignmentId, BoardPartition, StageId, StageSet};
use tracing::{debug, trace};

/// Opaque pre-move copy of the board, used only for rollback.
///
/// Lanes are immutable and shared, so taking a snapshot is cheap and later
/// moves can never write through into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    partition: BoardPartition,
    revision: u64,
}

impl Snapshot {
    /// Revision of the store when the snapshot was taken
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Read-only view of the captured board
    pub fn partition(&self) -> &BoardPartition {
        &self.partition
    }
}

/// Holds which assignment is in which stage, in what order, plus the
/// assignment currently being dragged.
///
/// Created when the board view is opened and dropped with it. The partition
/// only changes through [`initialize`](Self::initialize),
/// [`apply_move`](Self::apply_move) and [`restore`](Self::restore).
#[derive(Debug)]
pub struct BoardStore {
    partition: BoardPartition,
    active: Option<AssignmentId>,
    revision: u64,
}

impl BoardStore {
    /// Empty board over the given stages
    pub fn new(stages: &StageSet) -> Self {
        Self::with_partition(BoardPartition::empty(stages))
    }

    /// Store seeded with a partition that already satisfies the invariants
    pub fn with_partition(partition: BoardPartition) -> Self {
        Self {
            partition,
            active: None,
            revision: 0,
        }
    }

    /// Replace the whole board, e.g. after a full reload from the server.
    pub fn initialize(&mut self, partition: BoardPartition) {
        self.partition = partition;
        self.active = None;
        self.bump("initialize");
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            partition: self.partition.clone(),
            revision: self.revision,
        }
    }

    /// Put the board back the way it was when `snapshot` was taken.
    pub fn restore(&mut self, snapshot: Snapshot) {
        debug!(
            from_revision = self.revision,
            snapshot_revision = snapshot.revision,
            "restoring board snapshot"
        );
        self.partition = snapshot.partition;
        self.bump("restore");
    }

    /// Swap in the engine's result. Trusts the engine; no validation.
    pub fn apply_move(&mut self, plan: &MovePlan) {
        self.partition = plan.partition.clone();
        self.bump("apply_move");
    }

    /// Find a card and the stage it currently sits in
    pub fn find_assignment(&self, id: &AssignmentId) -> Option<(&Assignment, &StageId)> {
        let (stage, index) = self.partition.locate(id)?;
        let card = self.partition.lane(stage)?.get(index)?;
        Some((card, stage))
    }

    pub fn partition(&self) -> &BoardPartition {
        &self.partition
    }

    /// The assignment currently picked up, if any
    pub fn active_id(&self) -> Option<&AssignmentId> {
        self.active.as_ref()
    }

    pub fn set_active(&mut self, id: AssignmentId) {
        self.active = Some(id);
    }

    pub fn clear_active(&mut self) -> Option<AssignmentId> {
        self.active.take()
    }

    /// Counter bumped by every partition mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self, reason: &str) {
        self.revision += 1;
        trace!(revision = self.revision, reason, "board revision");
    }
}
