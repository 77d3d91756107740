//! Reordering engine: pure computation of the board after a move.
//!
//! Cross-stage moves and same-stage reorders run through the same steps:
//!
//! 1. remove the card from its source lane
//! 2. find the insertion index in the destination lane (as it stands after
//!    the removal)
//! 3. insert the card with its stage set to the destination
//! 4. renumber positions `0..n-1` in every touched lane
//!
//! Lanes that the move does not touch are shared with the input partition.
//! Unresolvable intents degrade to a no-op; nothing here can fail.

use crate::logging::Pretty;
use crate::types::{Assignment, AssignmentId, BoardPartition, InsertAt, MoveIntent, StageId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Where one card ends up. Also the wire body sent to persist a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub assignment_id: AssignmentId,
    pub stage: StageId,
    pub position: usize,
}

impl Placement {
    fn of(card: &Assignment) -> Self {
        Self {
            assignment_id: card.id.clone(),
            stage: card.stage.clone(),
            position: card.position,
        }
    }
}

/// Result of planning a move
#[derive(Debug, Clone)]
pub struct MovePlan {
    /// The board after the move (the input itself for a no-op)
    pub partition: BoardPartition,
    /// Placement of the moved card, `None` when nothing changes
    pub request: Option<Placement>,
    /// Every card whose stage or position changed, source lane first
    pub changes: Vec<Placement>,
}

impl MovePlan {
    fn noop(partition: &BoardPartition) -> Self {
        Self {
            partition: partition.clone(),
            request: None,
            changes: Vec::new(),
        }
    }

    /// True when the move leaves the board exactly as it was
    pub fn is_noop(&self) -> bool {
        self.request.is_none()
    }
}

/// Compute the board after applying `intent`.
pub fn compute_move(partition: &BoardPartition, intent: &MoveIntent) -> BoardPartition {
    plan_move(partition, intent).partition
}

/// Compute the board after applying `intent`, with the placements to persist.
pub fn plan_move(partition: &BoardPartition, intent: &MoveIntent) -> MovePlan {
    let id = &intent.assignment_id;

    let Some((source, from_index)) = partition.locate(id) else {
        debug!(assignment = %id, "move ignored: assignment not on board");
        return MovePlan::noop(partition);
    };
    let source = source.clone();
    let destination = &intent.destination;

    let Some(destination_lane) = partition.lane(destination) else {
        debug!(assignment = %id, stage = %destination, "move ignored: unknown stage");
        return MovePlan::noop(partition);
    };
    let same_stage = &source == destination;
    // in another stage the card is not there to insert before, so it appends
    if same_stage && matches!(&intent.insert_at, InsertAt::Before(other) if other == id) {
        debug!(assignment = %id, "move ignored: dropped onto itself");
        return MovePlan::noop(partition);
    }
    let mut source_cards = partition
        .lane(&source)
        .map(|lane| lane.to_vec())
        .unwrap_or_default();
    let card = source_cards.remove(from_index);

    let mut destination_cards = if same_stage {
        std::mem::take(&mut source_cards)
    } else {
        destination_lane.to_vec()
    };

    let index = match &intent.insert_at {
        InsertAt::Before(other) => destination_cards
            .iter()
            .position(|c| &c.id == other)
            .unwrap_or(destination_cards.len()),
        InsertAt::Index(n) => (*n).min(destination_cards.len()),
        InsertAt::End => destination_cards.len(),
    };

    if same_stage && index == from_index {
        debug!(assignment = %id, stage = %destination, index, "move ignored: no positional change");
        return MovePlan::noop(partition);
    }

    destination_cards.insert(index, card);

    let mut next = partition.clone();
    let mut changes = Vec::new();
    if !same_stage {
        let renumbered = renumber(&source, source_cards, &mut changes);
        next.replace_lane(&source, renumbered);
    }
    let renumbered = renumber(destination, destination_cards, &mut changes);
    next.replace_lane(destination, renumbered);

    debug!(
        assignment = %id,
        from = %source,
        to = %destination,
        index,
        changed = changes.len(),
        "move planned"
    );
    trace!("board after move: {}", Pretty(&next));

    MovePlan {
        partition: next,
        request: Some(Placement {
            assignment_id: id.clone(),
            stage: destination.clone(),
            position: index,
        }),
        changes,
    }
}

/// Rewrite stage and position to match list order, recording what moved.
fn renumber(stage: &StageId, cards: Vec<Assignment>, changes: &mut Vec<Placement>) -> Vec<Assignment> {
    cards
        .into_iter()
        .enumerate()
        .map(|(index, mut card)| {
            if card.position != index || &card.stage != stage {
                card.stage = stage.clone();
                card.position = index;
                changes.push(Placement::of(&card));
            }
            card
        })
        .collect()
}
