//! # gantry — Fargate stack CLI
//!
//! Deploys a small containerized web service to AWS Fargate from one
//! optional stack file. Single binary for planning, deploying, and
//! destroying the stack.

mod commands;
mod output;

use clap::Parser;

use crate::commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
        )
        .init();

    let cli = Cli::parse();
    commands::execute(cli).await
}
