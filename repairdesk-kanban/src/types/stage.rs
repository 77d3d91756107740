//! The ordered set of workflow stages a board is built over.

use super::ids::StageId;
use serde::{Deserialize, Serialize};

/// Stage names used when no stage list is configured.
pub const DEFAULT_STAGES: [&str; 6] = [
    "assigned",
    "in_progress",
    "completed",
    "ready_for_delivery",
    "delivered",
    "verified",
];

/// An ordered, duplicate-free list of stages.
///
/// The set is data-driven (configuration or server supplied) but closed once
/// a board is built from it: the board has exactly one list per stage here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageSet(Vec<StageId>);

impl StageSet {
    /// Build a stage set, dropping repeated names (first occurrence wins).
    pub fn new<I, S>(stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StageId>,
    {
        let mut out: Vec<StageId> = Vec::new();
        for stage in stages {
            let stage = stage.into();
            if !out.contains(&stage) {
                out.push(stage);
            }
        }
        Self(out)
    }

    pub fn contains(&self, stage: &StageId) -> bool {
        self.0.contains(stage)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StageSet {
    fn default() -> Self {
        Self::new(DEFAULT_STAGES)
    }
}

impl<'a> IntoIterator for &'a StageSet {
    type Item = &'a StageId;
    type IntoIter = std::slice::Iter<'a, StageId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
