//! Logging helpers

use serde::Serialize;
use std::fmt::Debug;

/// Wrapper for pretty-printing values in logs as YAML
///
/// ```ignore
/// use repairdesk_kanban::Pretty;
/// tracing::trace!("board: {}", Pretty(&partition));
/// ```
///
/// Outputs YAML with a leading newline. Debug is used as a fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Assignment, BoardPartition};

    #[test]
    fn test_pretty_renders_yaml() {
        let board = BoardPartition::from_lanes([(
            "assigned".into(),
            vec![Assignment::new(10u64, "assigned", 0)],
        )]);
        let out = Pretty(&board).to_string();
        assert!(out.starts_with('\n'));
        assert!(out.contains("assigned:"));
        assert!(out.contains("id: 10"));
    }
}
