//! Property-based tests for the reordering engine
//!
//! Random boards and random move intents, checking that every move keeps the
//! board well formed and that no-op moves leave it untouched.

use proptest::prelude::*;
use repairdesk_kanban::{
    compute_move, plan_move, Assignment, AssignmentId, BoardPartition, InsertAt, MoveIntent,
    StageId,
};
use std::collections::HashSet;

const STAGES: [&str; 4] = ["assigned", "in_progress", "completed", "delivered"];

/// Build a board from a per-card stage choice; card `i` gets id `i`.
fn board_from(choices: &[usize]) -> BoardPartition {
    let lanes = STAGES.iter().enumerate().map(|(stage_index, stage)| {
        let cards: Vec<Assignment> = choices
            .iter()
            .enumerate()
            .filter(|(_, choice)| **choice == stage_index)
            .enumerate()
            .map(|(position, (id, _))| Assignment::new(id as u64, *stage, position))
            .collect();
        (StageId::from(*stage), cards)
    });
    BoardPartition::from_lanes(lanes)
}

fn board() -> impl Strategy<Value = BoardPartition> {
    prop::collection::vec(0usize..STAGES.len(), 0..24).prop_map(|choices| board_from(&choices))
}

fn insert_at() -> impl Strategy<Value = InsertAt> {
    prop_oneof![
        Just(InsertAt::End),
        (0u64..30).prop_map(|id| InsertAt::Before(AssignmentId::from(id))),
        (0usize..30).prop_map(InsertAt::Index),
    ]
}

/// Intents may name cards and stages that are not on the board.
fn intent() -> impl Strategy<Value = MoveIntent> {
    (0u64..30, 0usize..STAGES.len() + 1, insert_at()).prop_map(|(id, stage, insert_at)| {
        MoveIntent {
            assignment_id: AssignmentId::from(id),
            destination: StageId::from(STAGES.get(stage).copied().unwrap_or("archived")),
            insert_at,
        }
    })
}

fn all_ids(board: &BoardPartition) -> HashSet<AssignmentId> {
    board
        .lanes()
        .flat_map(|(_, lane)| lane.iter().map(|c| c.id.clone()))
        .collect()
}

proptest! {
    /// Property: every move leaves contiguous positions and one lane per card
    #[test]
    fn prop_move_preserves_invariants(input in board(), intent in intent()) {
        let output = compute_move(&input, &intent);
        prop_assert!(output.check_invariants().is_ok());
        prop_assert_eq!(output.len(), input.len());
        prop_assert_eq!(all_ids(&output), all_ids(&input));
        prop_assert_eq!(
            output.stages().collect::<Vec<_>>(),
            input.stages().collect::<Vec<_>>()
        );
    }

    /// Property: a known card moved to a known stage ends up there
    #[test]
    fn prop_moved_card_lands_in_destination(input in board(), intent in intent()) {
        let plan = plan_move(&input, &intent);
        if let Some(placement) = &plan.request {
            let lane = plan.partition.lane(&placement.stage).unwrap();
            prop_assert_eq!(&lane[placement.position].id, &intent.assignment_id);
            prop_assert_eq!(&placement.stage, &intent.destination);
        } else {
            prop_assert_eq!(&plan.partition, &input);
        }
    }

    /// Property: dropping a card before its own successor changes nothing
    #[test]
    fn prop_drop_before_successor_is_noop(choices in prop::collection::vec(0usize..STAGES.len(), 2..24)) {
        let input = board_from(&choices);
        for (stage, lane) in input.lanes() {
            for pair in lane.windows(2) {
                let intent = MoveIntent::before(pair[0].id.clone(), stage.clone(), pair[1].id.clone());
                let plan = plan_move(&input, &intent);
                prop_assert!(plan.is_noop());
                prop_assert_eq!(&plan.partition, &input);
            }
        }
    }

    /// Property: only the reported cards changed stage or position
    #[test]
    fn prop_changes_match_diff(input in board(), intent in intent()) {
        let plan = plan_move(&input, &intent);
        let mut diff = Vec::new();
        for (stage, lane) in plan.partition.lanes() {
            for card in lane {
                let (old_stage, old_index) = input.locate(&card.id).unwrap();
                if old_stage != stage || old_index != card.position {
                    diff.push(card.id.clone());
                }
            }
        }
        let reported: Vec<AssignmentId> = plan.changes.iter().map(|p| p.assignment_id.clone()).collect();
        prop_assert_eq!(diff.len(), reported.len());
        for id in diff {
            prop_assert!(reported.contains(&id));
        }
    }
}

#[test]
fn test_cross_stage_move_before_card() {
    let input = BoardPartition::from_lanes([
        (
            StageId::from("A"),
            (1u64..=3)
                .enumerate()
                .map(|(i, id)| Assignment::new(id, "A", i))
                .collect(),
        ),
        (
            StageId::from("B"),
            (4u64..=5)
                .enumerate()
                .map(|(i, id)| Assignment::new(id, "B", i))
                .collect(),
        ),
    ]);

    let output = compute_move(&input, &MoveIntent::before(2u64, "B", 5u64));

    let a = output.lane(&"A".into()).unwrap();
    let b = output.lane(&"B".into()).unwrap();
    let summary = |lane: &[Assignment]| -> Vec<(String, usize)> {
        lane.iter().map(|c| (c.id.to_string(), c.position)).collect()
    };
    assert_eq!(
        summary(a),
        vec![("1".to_string(), 0), ("3".to_string(), 1)]
    );
    assert_eq!(
        summary(b),
        vec![("4".to_string(), 0), ("2".to_string(), 1), ("5".to_string(), 2)]
    );
}

#[test]
fn test_unknown_id_returns_input() {
    let input = board_from(&[0, 1, 1, 2]);
    assert_eq!(compute_move(&input, &MoveIntent::append(404u64, "completed")), input);
}
