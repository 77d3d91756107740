//! Building a board from the server's stage-grouped payload.
//!
//! The server sends `{ "<stage>": [assignment, ...], ... }` with every list
//! already in position order. Lists are never re-sorted; each card's stage and
//! position are rewritten from where it sits so the partition invariants hold
//! from the first render.

use crate::error::{BoardError, Result};
use crate::types::{Assignment, BoardPartition, StageId, StageSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use tracing::{debug, warn};

/// Raw board payload as received, keyed by stage name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardPayload(IndexMap<String, Vec<Assignment>>);

/// What ingest had to adjust or drop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Stage keys in the payload that are not on the board, with card counts
    pub ignored_stages: Vec<(String, usize)>,
    /// Cards whose recorded stage or position disagreed with where they sat
    pub renumbered: usize,
}

impl BoardPayload {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Build a partition over `stages`.
    ///
    /// Unknown stage keys are skipped (and reported), configured stages the
    /// payload leaves out come back empty, and a card listed twice is an error.
    pub fn into_partition(self, stages: &StageSet) -> Result<(BoardPartition, IngestReport)> {
        if stages.is_empty() {
            return Err(BoardError::NoStages);
        }

        let mut report = IngestReport::default();
        let mut grouped: IndexMap<StageId, Vec<Assignment>> = IndexMap::new();

        for (name, cards) in self.0 {
            let stage = StageId::from(name);
            if !stages.contains(&stage) {
                warn!(stage = %stage, cards = cards.len(), "ignoring unknown stage in payload");
                report.ignored_stages.push((stage.to_string(), cards.len()));
                continue;
            }
            grouped.insert(stage, cards);
        }

        let mut seen = HashSet::new();
        let mut lanes = Vec::with_capacity(stages.len());
        for stage in stages {
            let cards = grouped.swap_remove(stage).unwrap_or_default();
            let mut lane = Vec::with_capacity(cards.len());
            for (index, mut card) in cards.into_iter().enumerate() {
                if !seen.insert(card.id.clone()) {
                    return Err(BoardError::DuplicateAssignment {
                        id: card.id.to_string(),
                    });
                }
                if card.position != index || &card.stage != stage {
                    debug!(
                        assignment = %card.id,
                        stage = %stage,
                        recorded_stage = %card.stage,
                        recorded_position = card.position,
                        index,
                        "normalizing card placement"
                    );
                    card.stage = stage.clone();
                    card.position = index;
                    report.renumbered += 1;
                }
                lane.push(card);
            }
            lanes.push((stage.clone(), lane));
        }

        let partition = BoardPartition::from_lanes(lanes);
        debug!(
            stages = stages.len(),
            cards = partition.len(),
            renumbered = report.renumbered,
            "board payload ingested"
        );
        Ok((partition, report))
    }
}
