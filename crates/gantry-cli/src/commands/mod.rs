//! CLI command definitions and dispatch.

pub mod down;
pub mod plan;
pub mod up;

use clap::{Parser, Subcommand};

/// Gantry — containerized web services on Fargate from one small file.
#[derive(Parser, Debug)]
#[command(name = "gantry", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the stack file.
    #[arg(long, global = true, default_value = gantry_common::constants::DEFAULT_STACK_FILE)]
    pub file: String,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display the resources a deploy would create, without touching AWS.
    Plan,
    /// Build the image, deploy the stack, and print the service URL.
    Up,
    /// Destroy the stack's resources in reverse creation order.
    Down,
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Plan => plan::execute(&cli.file),
        Command::Up => up::execute(&cli.file).await,
        Command::Down => down::execute(&cli.file).await,
    }
}
