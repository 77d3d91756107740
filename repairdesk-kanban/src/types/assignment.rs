//! The draggable job assignment card.

use super::ids::{AssignmentId, StageId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A job assignment on the board.
///
/// Only `id`, `stage` and `position` are interpreted here. Everything else
/// the server sends (technician, billing, timestamps, notes) rides along in
/// `payload`, shared by reference and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    /// Stage this card is listed under. Ingest overwrites it with the group key.
    #[serde(default = "unset_stage")]
    pub stage: StageId,
    /// Zero-based rank within the stage list
    #[serde(default)]
    pub position: usize,
    #[serde(flatten)]
    pub payload: Arc<Map<String, Value>>,
}

fn unset_stage() -> StageId {
    StageId::from_string("")
}

impl Assignment {
    /// Create an assignment with an empty payload
    pub fn new(id: impl Into<AssignmentId>, stage: impl Into<StageId>, position: usize) -> Self {
        Self {
            id: id.into(),
            stage: stage.into(),
            position,
            payload: Arc::new(Map::new()),
        }
    }

    /// Attach an opaque payload
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Arc::new(payload);
        self
    }

    /// Copy of this card placed at `stage` / `position`, sharing the payload.
    pub fn placed(&self, stage: &StageId, position: usize) -> Self {
        Self {
            id: self.id.clone(),
            stage: stage.clone(),
            position,
            payload: Arc::clone(&self.payload),
        }
    }
}
