//! RepairDesk CLI - inspect and reorder the job assignment board.
//!
//! Commands:
//! - `repairdesk check <board.json>`: Load a board payload and report per-stage counts
//! - `repairdesk plan <board.json> --id <id> --stage <stage>`: Preview a move as JSON
//! - `repairdesk move <board.json> --id <id> --stage <stage>`: Perform and persist a move
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error, or the move was not persisted and the board was rolled back

use clap::Parser;
use tracing_subscriber::EnvFilter;

use repairdesk::commands;
use repairdesk::{Cli, Commands};

fn report(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level
    let filter = if cli.debug {
        EnvFilter::new("repairdesk=debug,repairdesk_kanban=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Commands::Check { board } => report(commands::run_check(&config, &board)),
        Commands::Plan { board, target } => report(commands::run_plan(&config, &board, &target)),
        Commands::Move { board, id, over } => {
            match commands::run_move(&config, &board, &id, &over).await {
                Ok(true) => 0,
                Ok(false) => 1,
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    1
                }
            }
        }
    };

    std::process::exit(exit_code);
}
