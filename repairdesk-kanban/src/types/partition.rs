//! Board partition: stage → ordered assignment list.

use super::assignment::Assignment;
use super::ids::{AssignmentId, StageId};
use super::stage::StageSet;
use crate::error::{BoardError, Result};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::sync::Arc;

/// One stage's cards, in position order.
///
/// Lanes are shared between a partition and any partition derived from it
/// until a move touches them.
pub type Lane = Arc<Vec<Assignment>>;

/// The whole board: one lane per stage, in stage order.
///
/// Valid partitions satisfy:
/// - every assignment id appears in exactly one lane
/// - positions in a lane are exactly `0..n-1` in list order
/// - every card's `stage` matches the lane it sits in
///
/// Construction through [`BoardPartition::empty`] / [`BoardPartition::from_lanes`]
/// does not check these; use [`BoardPartition::check_invariants`] or ingest a
/// [`BoardPayload`](crate::ingest::BoardPayload) at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardPartition {
    lanes: IndexMap<StageId, Lane>,
}

impl BoardPartition {
    /// An empty board over the given stages
    pub fn empty(stages: &StageSet) -> Self {
        Self {
            lanes: stages
                .iter()
                .map(|s| (s.clone(), Arc::new(Vec::new())))
                .collect(),
        }
    }

    /// Build from already-ordered lanes, trusting the caller.
    pub fn from_lanes<I>(lanes: I) -> Self
    where
        I: IntoIterator<Item = (StageId, Vec<Assignment>)>,
    {
        Self {
            lanes: lanes
                .into_iter()
                .map(|(stage, cards)| (stage, Arc::new(cards)))
                .collect(),
        }
    }

    /// The stages of this board, in board order
    pub fn stages(&self) -> impl Iterator<Item = &StageId> {
        self.lanes.keys()
    }

    pub fn has_stage(&self, stage: &StageId) -> bool {
        self.lanes.contains_key(stage)
    }

    /// Cards in a stage, or `None` for a stage not on this board
    pub fn lane(&self, stage: &StageId) -> Option<&[Assignment]> {
        self.lanes.get(stage).map(|lane| lane.as_slice())
    }

    /// Shared handle to a lane, for structural-sharing checks
    pub fn lane_handle(&self, stage: &StageId) -> Option<&Lane> {
        self.lanes.get(stage)
    }

    pub fn lanes(&self) -> impl Iterator<Item = (&StageId, &[Assignment])> {
        self.lanes.iter().map(|(s, lane)| (s, lane.as_slice()))
    }

    /// Total number of cards on the board
    pub fn len(&self) -> usize {
        self.lanes.values().map(|lane| lane.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.values().all(|lane| lane.is_empty())
    }

    /// Locate a card: its stage and index in that stage's lane.
    pub fn locate(&self, id: &AssignmentId) -> Option<(&StageId, usize)> {
        self.lanes.iter().find_map(|(stage, lane)| {
            lane.iter()
                .position(|card| &card.id == id)
                .map(|index| (stage, index))
        })
    }

    /// Ids of a lane in order, handy for assertions and summaries
    pub fn ids(&self, stage: &StageId) -> Vec<AssignmentId> {
        self.lane(stage)
            .map(|lane| lane.iter().map(|c| c.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Swap in a replacement lane for an existing stage.
    pub(crate) fn replace_lane(&mut self, stage: &StageId, cards: Vec<Assignment>) {
        if let Some(lane) = self.lanes.get_mut(stage) {
            *lane = Arc::new(cards);
        }
    }

    /// Verify the partition invariants, reporting the first violation.
    pub fn check_invariants(&self) -> Result<()> {
        let mut seen: HashSet<&AssignmentId> = HashSet::new();
        for (stage, lane) in &self.lanes {
            for (index, card) in lane.iter().enumerate() {
                if !seen.insert(&card.id) {
                    return Err(BoardError::DuplicateAssignment {
                        id: card.id.to_string(),
                    });
                }
                if &card.stage != stage {
                    return Err(BoardError::StageMismatch {
                        id: card.id.to_string(),
                        listed: stage.to_string(),
                        recorded: card.stage.to_string(),
                    });
                }
                if card.position != index {
                    return Err(BoardError::PositionMismatch {
                        id: card.id.to_string(),
                        stage: stage.to_string(),
                        expected: index,
                        actual: card.position,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Serializes in the same shape the server sends: `{ stage: [cards...] }`.
impl Serialize for BoardPartition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.lanes.iter().map(|(s, lane)| (s, lane.as_slice())))
    }
}
