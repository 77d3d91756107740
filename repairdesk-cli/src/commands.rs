//! Command implementations.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use repairdesk_kanban::{
    plan_move, AssignmentId, BoardConfig, BoardPartition, BoardPayload, BoardStore, CommitOutcome,
    ConfigLoader, DragController, DropTarget, HttpSync, IngestReport, InsertAt, MoveIntent,
    Placement, Pretty,
};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::cli::{DropArgs, PlanTarget};

/// Load configuration from defaults, the optional file and the environment.
pub fn load_config(path: Option<&Path>) -> Result<BoardConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = path {
        loader = loader.with_file(path);
    }
    let config = loader.load().context("failed to load configuration")?;
    debug!("configuration: {}", Pretty(&config));
    Ok(config)
}

/// Read a board payload and build the partition for the configured stages.
pub fn load_board(config: &BoardConfig, path: &Path) -> Result<(BoardPartition, IngestReport)> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let payload = BoardPayload::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a board payload", path.display()))?;
    let (partition, report) = payload.into_partition(&config.stage_set())?;
    trace!("board loaded: {}", Pretty(&partition));
    Ok((partition, report))
}

/// `repairdesk check`
pub fn run_check(config: &BoardConfig, path: &Path) -> Result<()> {
    let (partition, report) = load_board(config, path)?;
    partition.check_invariants()?;

    for (stage, lane) in partition.lanes() {
        println!("{}: {}", stage, lane.len());
    }
    for (stage, count) in &report.ignored_stages {
        println!("ignored stage '{}' ({} assignments)", stage, count);
    }
    if report.renumbered > 0 {
        println!("{} assignments renumbered", report.renumbered);
    }
    println!(
        "{} assignments in {} stages",
        partition.len(),
        partition.stages().count()
    );
    Ok(())
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    board: &'a BoardPartition,
    request: Option<&'a Placement>,
    changes: &'a [Placement],
}

/// `repairdesk plan`
pub fn run_plan(config: &BoardConfig, path: &Path, target: &PlanTarget) -> Result<()> {
    let (partition, _) = load_board(config, path)?;

    let insert_at = match (&target.before, target.index) {
        (Some(before), _) => InsertAt::Before(AssignmentId::parse(before)),
        (None, Some(index)) => InsertAt::Index(index),
        (None, None) => InsertAt::End,
    };
    let intent = MoveIntent {
        assignment_id: AssignmentId::parse(&target.id),
        destination: target.stage.as_str().into(),
        insert_at,
    };

    let plan = plan_move(&partition, &intent);
    if plan.is_noop() {
        info!(assignment = %intent.assignment_id, "move would change nothing");
    }

    let output = PlanOutput {
        board: &plan.partition,
        request: plan.request.as_ref(),
        changes: &plan.changes,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[derive(Serialize)]
struct MoveOutput<'a> {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    placement: Option<&'a Placement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    board: &'a BoardPartition,
}

/// `repairdesk move`. Returns whether the board and the server agree
/// afterwards.
pub async fn run_move(config: &BoardConfig, path: &Path, id: &str, over: &DropArgs) -> Result<bool> {
    let (partition, _) = load_board(config, path)?;
    let remote = HttpSync::new(&config.sync)?;
    let mut store = BoardStore::with_partition(partition);
    let mut controller = DragController::with_timeout(config.sync.timeout());

    let id = AssignmentId::parse(id);
    if !controller.drag_start(&mut store, id.clone()) {
        bail!("assignment {} is not on the board", id);
    }

    let target = if let Some(stage) = &over.stage {
        DropTarget::Stage(stage.as_str().into())
    } else if let Some(card) = &over.over {
        DropTarget::Card(AssignmentId::parse(card))
    } else {
        bail!("a drop target is required");
    };

    let outcome = controller.commit(&mut store, &remote, Some(target)).await;
    let (label, placement, error) = match &outcome {
        CommitOutcome::Ignored => bail!("drop target is not on the board"),
        CommitOutcome::Unchanged => ("unchanged", None, None),
        CommitOutcome::Persisted(placement) => ("persisted", Some(placement), None),
        CommitOutcome::RolledBack { placement, error } => {
            ("rolled_back", Some(placement), Some(error.to_string()))
        }
        CommitOutcome::StaleRollbackSkipped { placement, error } => {
            ("stale_rollback_skipped", Some(placement), Some(error.to_string()))
        }
    };

    let output = MoveOutput {
        outcome: label,
        placement,
        error,
        board: store.partition(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(!outcome.is_failure())
}
