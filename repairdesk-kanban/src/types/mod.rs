//! Core types for the assignment board

mod assignment;
mod ids;
mod intent;
mod partition;
mod stage;

// Re-export all types
pub use assignment::Assignment;
pub use ids::{AssignmentId, StageId};
pub use intent::{DropTarget, InsertAt, MoveIntent};
pub use partition::{BoardPartition, Lane};
pub use stage::{StageSet, DEFAULT_STAGES};
