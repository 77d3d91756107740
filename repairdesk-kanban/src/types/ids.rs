//! Identifier newtypes for stages and assignments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a workflow stage (kanban column), e.g. `in_progress`.
///
/// Stage ids are opaque to the engine; only equality and the order of the
/// configured [`StageSet`](super::StageSet) matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    /// Create a stage id from any string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for StageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a job assignment card.
///
/// The server hands out integer primary keys, but some payloads carry string
/// ids. Both are accepted and serialized back in the shape they arrived in,
/// so placement requests echo the server's own id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssignmentId {
    Numeric(u64),
    Text(String),
}

impl AssignmentId {
    /// Parse an id typed by a human: digits become a numeric id.
    pub fn parse(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) => Self::Numeric(n),
            Err(_) => Self::Text(s.to_string()),
        }
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for AssignmentId {
    fn from(n: u64) -> Self {
        Self::Numeric(n)
    }
}

impl From<&str> for AssignmentId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AssignmentId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
