//! CLI definition for the `repairdesk` command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// RepairDesk - job assignment board tooling.
///
/// Reads a stage-grouped board payload (as served by the ERP), checks it,
/// previews moves offline and performs moves against the placement endpoint.
#[derive(Parser, Debug)]
#[command(name = "repairdesk")]
#[command(version)]
#[command(about = "Inspect and reorder the RepairDesk job assignment board")]
#[command(
    long_about = "Inspect and reorder the RepairDesk job assignment board.\n\n\
    Configuration is read from --config (TOML, YAML or JSON) and from\n\
    REPAIRDESK_* environment variables, e.g.\n  \
    REPAIRDESK_SYNC__BASE_URL   ERP server the move is sent to\n  \
    REPAIRDESK_SYNC__TOKEN      Bearer token for the placement endpoint"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a board payload and check it is well formed
    Check {
        /// Board payload (JSON, keyed by stage)
        board: PathBuf,
    },

    /// Show what a move would do, without contacting the server
    Plan {
        /// Board payload (JSON, keyed by stage)
        board: PathBuf,
        #[command(flatten)]
        target: PlanTarget,
    },

    /// Drag a card onto a stage or another card and persist the result
    Move {
        /// Board payload (JSON, keyed by stage)
        board: PathBuf,
        /// Assignment being dragged
        #[arg(long, value_name = "ID")]
        id: String,
        #[command(flatten)]
        over: DropArgs,
    },
}

#[derive(Args, Debug)]
pub struct PlanTarget {
    /// Assignment to move
    #[arg(long, value_name = "ID")]
    pub id: String,
    /// Destination stage
    #[arg(long, value_name = "STAGE")]
    pub stage: String,
    /// Insert before this assignment
    #[arg(long, value_name = "ID", conflicts_with = "index")]
    pub before: Option<String>,
    /// Insert at this index in the destination stage
    #[arg(long, value_name = "N")]
    pub index: Option<usize>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct DropArgs {
    /// Drop over a stage column (appends)
    #[arg(long, value_name = "STAGE")]
    pub stage: Option<String>,
    /// Drop over another card
    #[arg(long, value_name = "ID")]
    pub over: Option<String>,
}
