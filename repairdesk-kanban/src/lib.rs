//! Optimistic job-assignment kanban for the RepairDesk service ERP
//!
//! This crate owns the client's view of the technician assignment board:
//! which job assignment sits in which workflow stage, and in what order. The
//! server owns everything else. A drag-and-drop move is computed locally,
//! shown immediately, then persisted; if the server refuses it the board
//! snaps back.
//!
//! ## Overview
//!
//! - **Reordering engine** ([`engine`]) - pure `compute_move` / `plan_move`
//! - **Board store** ([`BoardStore`]) - owns the partition, snapshots and rollback
//! - **Drag controller** ([`DragController`]) - Idle / Dragging / Committing
//! - **Remote sync** ([`sync`]) - one placement request per committed move
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use repairdesk_kanban::{
//!     BoardPayload, BoardStore, ConfigLoader, DragController, DropTarget, HttpSync,
//! };
//!
//! # async fn example(json: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! let (partition, _report) = BoardPayload::from_json(json)?.into_partition(&config.stage_set())?;
//! let mut store = BoardStore::with_partition(partition);
//! let remote = HttpSync::new(&config.sync)?;
//! let mut controller = DragController::with_timeout(config.sync.timeout());
//!
//! controller.drag_start(&mut store, 10u64.into());
//! let outcome = controller
//!     .commit(&mut store, &remote, Some(DropTarget::Stage("in_progress".into())))
//!     .await;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod engine;
mod error;
pub mod ingest;
mod logging;
mod store;
pub mod sync;
pub mod types;

pub use config::{BoardConfig, ConfigError, ConfigLoader, SyncConfig};
pub use controller::{CommitOutcome, DragController, DragPhase, DropOutcome, PendingCommit};
pub use engine::{compute_move, plan_move, MovePlan, Placement};
pub use error::{BoardError, Result};
pub use ingest::{BoardPayload, IngestReport};
pub use logging::Pretty;
pub use store::{BoardStore, Snapshot};
pub use sync::{HttpSync, RemoteSync, SyncError};

// Re-export commonly used types
pub use types::{
    Assignment, AssignmentId, BoardPartition, DropTarget, InsertAt, MoveIntent, StageId, StageSet,
};
