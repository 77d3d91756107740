//! Drag interaction controller: one gesture from pick-up to settle.
//!
//! ```text
//!   Idle ──drag_start──▶ Dragging ──drop(no target / no change)──▶ Idle
//!                           │  └──drag_cancel──▶ Idle
//!                           └──drop(move)──▶ Committing ──resolve──▶ Idle
//! ```
//!
//! A drop that changes the board is applied to the store immediately and
//! handed back as a [`PendingCommit`]. Sending it borrows nothing from the
//! store, so new gestures can start while it is in flight. Every commit gets
//! a sequence number. A failed commit rolls back unless a newer commit is
//! still pending or has persisted. While a newer commit is pending the
//! failed commit's snapshot is held back; if that newer commit fails too, the
//! board goes back to the oldest held snapshot.

use crate::engine::{plan_move, Placement};
use crate::store::{BoardStore, Snapshot};
use crate::sync::{RemoteSync, SyncError};
use crate::types::{AssignmentId, DropTarget, InsertAt, MoveIntent};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default time to wait for the server before treating a move as failed
pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the controller is in the gesture cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    Committing,
}

/// An optimistically applied move waiting for the server.
#[derive(Debug)]
pub struct PendingCommit {
    seq: u64,
    snapshot: Snapshot,
    placement: Placement,
    changes: Vec<Placement>,
}

impl PendingCommit {
    /// Sequence number, increasing with every commit started
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The placement sent to the server
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Every card whose stage or position the move changed
    pub fn changes(&self) -> &[Placement] {
        &self.changes
    }

    /// Ask the remote to persist the move. A call still pending after
    /// `timeout` counts as failed.
    pub async fn send<R>(&self, remote: &R, timeout: Duration) -> Result<(), SyncError>
    where
        R: RemoteSync + ?Sized,
    {
        match tokio::time::timeout(timeout, remote.persist(&self.placement)).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(timeout)),
        }
    }
}

/// Result of releasing a dragged card
#[derive(Debug)]
pub enum DropOutcome {
    /// No drag in progress, no target, or a target that no longer resolves
    Ignored,
    /// Dropped where it already was
    Unchanged,
    /// Applied to the store; persist it and then [`DragController::resolve`]
    Committing(PendingCommit),
}

/// How a gesture finally settled
#[derive(Debug)]
pub enum CommitOutcome {
    /// Nothing was moved
    Ignored,
    /// Dropped where it already was; the server was not contacted
    Unchanged,
    /// The server accepted the move
    Persisted(Placement),
    /// The server refused the move and the board was put back
    RolledBack { placement: Placement, error: SyncError },
    /// The server refused the move, but a newer move is pending or has
    /// persisted, so the board was left alone
    StaleRollbackSkipped { placement: Placement, error: SyncError },
}

impl CommitOutcome {
    /// Whether the board now shows something the server has not accepted
    /// or has refused
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::RolledBack { .. } | Self::StaleRollbackSkipped { .. }
        )
    }
}

/// What the controller knows about a commit it started
#[derive(Debug)]
enum CommitState {
    Pending,
    Persisted,
    /// Failed while a newer commit was live; the snapshot waits on it
    Failed(Snapshot),
}

/// Sequences drag gestures and owns the optimistic commit / rollback protocol.
#[derive(Debug)]
pub struct DragController {
    phase: DragPhase,
    timeout: Duration,
    next_seq: u64,
    /// Commits by sequence number; emptied whenever nothing is pending
    commits: BTreeMap<u64, CommitState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_COMMIT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            phase: DragPhase::Idle,
            timeout,
            next_seq: 1,
            commits: BTreeMap::new(),
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of commits sent but not yet resolved
    pub fn in_flight(&self) -> usize {
        self.commits
            .values()
            .filter(|state| matches!(state, CommitState::Pending))
            .count()
    }

    /// Pick up a card. Returns false (and changes nothing) if the card is not
    /// on the board.
    pub fn drag_start(&mut self, store: &mut BoardStore, id: AssignmentId) -> bool {
        if store.find_assignment(&id).is_none() {
            debug!(assignment = %id, "drag start ignored: assignment not on board");
            return false;
        }
        debug!(assignment = %id, "drag started");
        store.set_active(id);
        self.phase = DragPhase::Dragging;
        true
    }

    /// Abandon the current drag (escape key, released outside the board).
    pub fn drag_cancel(&mut self, store: &mut BoardStore) {
        if let Some(id) = store.clear_active() {
            debug!(assignment = %id, "drag cancelled");
        }
        self.settle_phase();
    }

    /// Release the dragged card over `over` (or over nothing).
    pub fn drop(&mut self, store: &mut BoardStore, over: Option<DropTarget>) -> DropOutcome {
        let Some(active) = store.clear_active() else {
            self.settle_phase();
            return DropOutcome::Ignored;
        };
        let Some(intent) = over.and_then(|target| Self::intent_for(&*store, &active, target)) else {
            debug!(assignment = %active, "drop ignored: no valid target");
            self.settle_phase();
            return DropOutcome::Ignored;
        };

        let snapshot = store.snapshot();
        let plan = plan_move(store.partition(), &intent);
        let Some(placement) = plan.request.clone() else {
            self.settle_phase();
            return DropOutcome::Unchanged;
        };

        store.apply_move(&plan);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.commits.insert(seq, CommitState::Pending);
        self.phase = DragPhase::Committing;

        debug!(
            seq,
            assignment = %placement.assignment_id,
            stage = %placement.stage,
            position = placement.position,
            "move applied optimistically"
        );

        DropOutcome::Committing(PendingCommit {
            seq,
            snapshot,
            placement,
            changes: plan.changes,
        })
    }

    /// Settle a commit with the remote's answer, rolling back on failure.
    pub fn resolve(
        &mut self,
        store: &mut BoardStore,
        pending: PendingCommit,
        result: Result<(), SyncError>,
    ) -> CommitOutcome {
        let PendingCommit {
            seq,
            snapshot,
            placement,
            ..
        } = pending;
        let newer_live = self
            .commits
            .range(seq + 1..)
            .any(|(_, state)| !matches!(state, CommitState::Failed(_)));

        let outcome = match result {
            Ok(()) => {
                info!(
                    seq,
                    assignment = %placement.assignment_id,
                    stage = %placement.stage,
                    position = placement.position,
                    "move persisted"
                );
                self.commits.insert(seq, CommitState::Persisted);
                CommitOutcome::Persisted(placement)
            }
            Err(error) if newer_live => {
                warn!(
                    seq,
                    assignment = %placement.assignment_id,
                    "move not persisted, newer move in place so rollback skipped: {}",
                    error
                );
                self.commits.insert(seq, CommitState::Failed(snapshot));
                CommitOutcome::StaleRollbackSkipped { placement, error }
            }
            Err(error) => {
                self.commits.remove(&seq);
                let target = self.take_failed_before(seq).unwrap_or(snapshot);
                warn!(
                    seq,
                    assignment = %placement.assignment_id,
                    revision = target.revision(),
                    "move not persisted, rolling back: {}",
                    error
                );
                store.restore(target);
                CommitOutcome::RolledBack { placement, error }
            }
        };

        if self.in_flight() == 0 {
            self.commits.clear();
        }
        // a gesture started while this commit was in flight keeps going
        if self.phase != DragPhase::Dragging {
            self.settle_phase();
        }
        outcome
    }

    /// Remove the failed commits directly older than `seq` and return the
    /// oldest of their snapshots.
    fn take_failed_before(&mut self, seq: u64) -> Option<Snapshot> {
        let failed: Vec<u64> = self
            .commits
            .range(..seq)
            .rev()
            .take_while(|(_, state)| matches!(state, CommitState::Failed(_)))
            .map(|(seq, _)| *seq)
            .collect();

        let mut oldest = None;
        for seq in failed {
            if let Some(CommitState::Failed(snapshot)) = self.commits.remove(&seq) {
                debug!(seq, "folding held rollback into newer failure");
                oldest = Some(snapshot);
            }
        }
        oldest
    }

    /// Drop, persist and resolve in one go.
    pub async fn commit<R>(
        &mut self,
        store: &mut BoardStore,
        remote: &R,
        over: Option<DropTarget>,
    ) -> CommitOutcome
    where
        R: RemoteSync + ?Sized,
    {
        match self.drop(store, over) {
            DropOutcome::Ignored => CommitOutcome::Ignored,
            DropOutcome::Unchanged => CommitOutcome::Unchanged,
            DropOutcome::Committing(pending) => {
                let result = pending.send(remote, self.timeout).await;
                self.resolve(store, pending, result)
            }
        }
    }

    /// Turn a drop target into a move intent.
    ///
    /// Over a stage column: append to it. Over a card in another stage:
    /// insert before that card. Over a card in the same stage: take that
    /// card's index, so a card can also move down past its neighbour.
    fn intent_for(
        store: &BoardStore,
        active: &AssignmentId,
        target: DropTarget,
    ) -> Option<MoveIntent> {
        let (_, source) = store.find_assignment(active)?;
        match target {
            DropTarget::Stage(stage) => {
                store.partition().has_stage(&stage).then(|| MoveIntent {
                    assignment_id: active.clone(),
                    destination: stage,
                    insert_at: InsertAt::End,
                })
            }
            DropTarget::Card(over) => {
                let (over_card, over_stage) = store.find_assignment(&over)?;
                let insert_at = if over_stage == source {
                    InsertAt::Index(over_card.position)
                } else {
                    InsertAt::Before(over)
                };
                Some(MoveIntent {
                    assignment_id: active.clone(),
                    destination: over_stage.clone(),
                    insert_at,
                })
            }
        }
    }

    fn settle_phase(&mut self) {
        self.phase = if self.in_flight() > 0 {
            DragPhase::Committing
        } else {
            DragPhase::Idle
        };
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Assignment, BoardPartition, StageId};

    fn store() -> BoardStore {
        let lane = |stage: &str, ids: &[u64]| -> (StageId, Vec<Assignment>) {
            (
                stage.into(),
                ids.iter()
                    .enumerate()
                    .map(|(i, id)| Assignment::new(*id, stage, i))
                    .collect(),
            )
        };
        BoardStore::with_partition(BoardPartition::from_lanes([
            lane("assigned", &[1, 2, 3]),
            lane("in_progress", &[4]),
        ]))
    }

    fn ids(store: &BoardStore, stage: &str) -> Vec<String> {
        store
            .partition()
            .ids(&stage.into())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_drag_start_unknown_card() {
        let mut store = store();
        let mut ctl = DragController::new();
        assert!(!ctl.drag_start(&mut store, 99u64.into()));
        assert_eq!(ctl.phase(), DragPhase::Idle);
        assert!(store.active_id().is_none());
    }

    #[test]
    fn test_cancel_returns_to_idle_without_mutation() {
        let mut store = store();
        let before = store.partition().clone();
        let mut ctl = DragController::new();
        assert!(ctl.drag_start(&mut store, 1u64.into()));
        assert_eq!(ctl.phase(), DragPhase::Dragging);
        ctl.drag_cancel(&mut store);
        assert_eq!(ctl.phase(), DragPhase::Idle);
        assert_eq!(store.partition(), &before);
        assert!(store.active_id().is_none());
    }

    #[test]
    fn test_drop_over_nothing_is_ignored() {
        let mut store = store();
        let revision = store.revision();
        let mut ctl = DragController::new();
        ctl.drag_start(&mut store, 1u64.into());
        assert!(matches!(ctl.drop(&mut store, None), DropOutcome::Ignored));
        assert_eq!(ctl.phase(), DragPhase::Idle);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_drop_without_drag_is_ignored() {
        let mut store = store();
        let mut ctl = DragController::new();
        let outcome = ctl.drop(&mut store, Some(DropTarget::Stage("in_progress".into())));
        assert!(matches!(outcome, DropOutcome::Ignored));
    }

    #[test]
    fn test_drop_over_unknown_stage_is_ignored() {
        let mut store = store();
        let mut ctl = DragController::new();
        ctl.drag_start(&mut store, 1u64.into());
        let outcome = ctl.drop(&mut store, Some(DropTarget::Stage("archived".into())));
        assert!(matches!(outcome, DropOutcome::Ignored));
    }

    #[test]
    fn test_drop_onto_own_position_is_unchanged() {
        let mut store = store();
        let revision = store.revision();
        let mut ctl = DragController::new();
        ctl.drag_start(&mut store, 2u64.into());
        let outcome = ctl.drop(&mut store, Some(DropTarget::Card(2u64.into())));
        assert!(matches!(outcome, DropOutcome::Unchanged));
        assert_eq!(ctl.phase(), DragPhase::Idle);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_drop_over_card_in_same_stage_moves_down() {
        let mut store = store();
        let mut ctl = DragController::new();
        ctl.drag_start(&mut store, 1u64.into());
        let outcome = ctl.drop(&mut store, Some(DropTarget::Card(2u64.into())));
        let DropOutcome::Committing(pending) = outcome else {
            panic!("expected a commit");
        };
        assert_eq!(ids(&store, "assigned"), vec!["2", "1", "3"]);
        assert_eq!(pending.placement().position, 1);
        assert_eq!(ctl.phase(), DragPhase::Committing);
    }

    #[test]
    fn test_drop_over_card_in_other_stage_goes_before_it() {
        let mut store = store();
        let mut ctl = DragController::new();
        ctl.drag_start(&mut store, 3u64.into());
        let DropOutcome::Committing(pending) =
            ctl.drop(&mut store, Some(DropTarget::Card(4u64.into())))
        else {
            panic!("expected a commit");
        };
        assert_eq!(ids(&store, "in_progress"), vec!["3", "4"]);
        assert_eq!(pending.placement().stage.as_str(), "in_progress");
        assert_eq!(pending.placement().position, 0);
        assert_eq!(pending.changes().len(), 2);
    }

    #[test]
    fn test_resolve_failure_rolls_back() {
        let mut store = store();
        let before = store.partition().clone();
        let mut ctl = DragController::new();
        ctl.drag_start(&mut store, 1u64.into());
        let DropOutcome::Committing(pending) =
            ctl.drop(&mut store, Some(DropTarget::Stage("in_progress".into())))
        else {
            panic!("expected a commit");
        };
        let outcome = ctl.resolve(&mut store, pending, Err(SyncError::rejected(500, "down")));
        assert!(matches!(outcome, CommitOutcome::RolledBack { .. }));
        assert_eq!(store.partition(), &before);
        assert_eq!(ctl.phase(), DragPhase::Idle);
        assert_eq!(ctl.in_flight(), 0);
    }

    #[test]
    fn test_stale_rollback_is_skipped() {
        let mut store = store();
        let mut ctl = DragController::new();

        ctl.drag_start(&mut store, 1u64.into());
        let DropOutcome::Committing(first) =
            ctl.drop(&mut store, Some(DropTarget::Stage("in_progress".into())))
        else {
            panic!("expected a commit");
        };

        ctl.drag_start(&mut store, 2u64.into());
        let DropOutcome::Committing(second) =
            ctl.drop(&mut store, Some(DropTarget::Stage("in_progress".into())))
        else {
            panic!("expected a commit");
        };
        assert!(second.seq() > first.seq());
        assert_eq!(ctl.in_flight(), 2);

        let after_both = store.partition().clone();
        let outcome = ctl.resolve(&mut store, second, Ok(()));
        assert!(matches!(outcome, CommitOutcome::Persisted(_)));
        assert_eq!(ctl.phase(), DragPhase::Committing);

        let outcome = ctl.resolve(&mut store, first, Err(SyncError::Other("lost".into())));
        assert!(matches!(outcome, CommitOutcome::StaleRollbackSkipped { .. }));
        assert!(outcome.is_failure());
        assert_eq!(store.partition(), &after_both);
        assert_eq!(ctl.phase(), DragPhase::Idle);
    }

    fn two_commits(
        store: &mut BoardStore,
        ctl: &mut DragController,
    ) -> (PendingCommit, PendingCommit) {
        ctl.drag_start(store, 1u64.into());
        let DropOutcome::Committing(first) =
            ctl.drop(store, Some(DropTarget::Stage("in_progress".into())))
        else {
            panic!("expected a commit");
        };
        ctl.drag_start(store, 2u64.into());
        let DropOutcome::Committing(second) =
            ctl.drop(store, Some(DropTarget::Stage("in_progress".into())))
        else {
            panic!("expected a commit");
        };
        (first, second)
    }

    #[test]
    fn test_both_fail_newer_first_restores_original() {
        let mut store = store();
        let before = store.partition().clone();
        let mut ctl = DragController::new();
        let (first, second) = two_commits(&mut store, &mut ctl);

        let outcome = ctl.resolve(&mut store, second, Err(SyncError::rejected(409, "busy")));
        assert!(matches!(outcome, CommitOutcome::RolledBack { .. }));
        assert_eq!(ids(&store, "in_progress"), vec!["4", "1"]);
        assert_eq!(ctl.phase(), DragPhase::Committing);

        let outcome = ctl.resolve(&mut store, first, Err(SyncError::rejected(409, "busy")));
        assert!(matches!(outcome, CommitOutcome::RolledBack { .. }));
        assert_eq!(store.partition(), &before);
        assert_eq!(ctl.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_both_fail_older_first_restores_original() {
        let mut store = store();
        let before = store.partition().clone();
        let mut ctl = DragController::new();
        let (first, second) = two_commits(&mut store, &mut ctl);

        let outcome = ctl.resolve(&mut store, first, Err(SyncError::rejected(409, "busy")));
        assert!(matches!(outcome, CommitOutcome::StaleRollbackSkipped { .. }));
        assert_eq!(ids(&store, "in_progress"), vec!["4", "1", "2"]);
        assert_eq!(ctl.in_flight(), 1);

        let outcome = ctl.resolve(&mut store, second, Err(SyncError::rejected(409, "busy")));
        assert!(matches!(outcome, CommitOutcome::RolledBack { .. }));
        assert_eq!(store.partition(), &before);
        assert_eq!(ctl.in_flight(), 0);
    }

    #[test]
    fn test_older_pending_survives_newer_rollback() {
        let mut store = store();
        let mut ctl = DragController::new();
        let (first, second) = two_commits(&mut store, &mut ctl);

        ctl.resolve(&mut store, second, Err(SyncError::Other("lost".into())));
        let outcome = ctl.resolve(&mut store, first, Ok(()));
        assert!(matches!(outcome, CommitOutcome::Persisted(_)));
        assert_eq!(ids(&store, "assigned"), vec!["2", "3"]);
        assert_eq!(ids(&store, "in_progress"), vec!["4", "1"]);
    }

    #[test]
    fn test_new_drag_while_committing() {
        let mut store = store();
        let mut ctl = DragController::new();
        ctl.drag_start(&mut store, 1u64.into());
        let DropOutcome::Committing(pending) =
            ctl.drop(&mut store, Some(DropTarget::Stage("in_progress".into())))
        else {
            panic!("expected a commit");
        };
        assert!(ctl.drag_start(&mut store, 2u64.into()));
        assert_eq!(ctl.phase(), DragPhase::Dragging);
        ctl.drag_cancel(&mut store);
        assert_eq!(ctl.phase(), DragPhase::Committing);
        ctl.resolve(&mut store, pending, Ok(()));
        assert_eq!(ctl.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_resolve_during_drag_keeps_dragging() {
        let mut store = store();
        let mut ctl = DragController::new();
        ctl.drag_start(&mut store, 1u64.into());
        let DropOutcome::Committing(pending) =
            ctl.drop(&mut store, Some(DropTarget::Stage("in_progress".into())))
        else {
            panic!("expected a commit");
        };
        ctl.drag_start(&mut store, 3u64.into());
        ctl.resolve(&mut store, pending, Ok(()));
        assert_eq!(ctl.phase(), DragPhase::Dragging);
        assert_eq!(store.active_id(), Some(&AssignmentId::from(3u64)));
    }
}
