//! Move intents and drop targets.

use super::ids::{AssignmentId, StageId};
use serde::{Deserialize, Serialize};

/// Where in the destination lane a moved card lands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertAt {
    /// Immediately before this card. Falls back to the end if the card is
    /// not in the destination lane.
    Before(AssignmentId),
    /// Final index in the destination lane, clamped to its length.
    Index(usize),
    /// Append at the end of the destination lane.
    End,
}

/// A request to move one card, produced per drop gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub assignment_id: AssignmentId,
    pub destination: StageId,
    pub insert_at: InsertAt,
}

impl MoveIntent {
    /// Move to the end of a stage
    pub fn append(id: impl Into<AssignmentId>, stage: impl Into<StageId>) -> Self {
        Self {
            assignment_id: id.into(),
            destination: stage.into(),
            insert_at: InsertAt::End,
        }
    }

    /// Move into a stage, just before another card
    pub fn before(
        id: impl Into<AssignmentId>,
        stage: impl Into<StageId>,
        before: impl Into<AssignmentId>,
    ) -> Self {
        Self {
            assignment_id: id.into(),
            destination: stage.into(),
            insert_at: InsertAt::Before(before.into()),
        }
    }

    /// Move into a stage at a final index
    pub fn at_index(id: impl Into<AssignmentId>, stage: impl Into<StageId>, index: usize) -> Self {
        Self {
            assignment_id: id.into(),
            destination: stage.into(),
            insert_at: InsertAt::Index(index),
        }
    }
}

/// What the drag layer reports the card was released over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DropTarget {
    /// Another card
    Card(AssignmentId),
    /// A stage column's empty area
    Stage(StageId),
}
