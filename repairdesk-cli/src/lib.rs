//! RepairDesk operator CLI: board checks, offline move previews and committed
//! moves against the ERP placement endpoint.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, DropArgs, PlanTarget};
