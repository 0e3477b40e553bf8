//! `gantry down` — Destroy the stack in reverse creation order.

use std::path::Path;
use std::time::Instant;

use gantry_common::config::StackConfig;
use gantry_provision::aws::AwsProvisioner;
use gantry_provision::deployer::Deployer;
use gantry_topology::topology::Topology;

use crate::output::{BOLD, GREEN, RESET};

/// Executes the `down` command.
///
/// Resource names are derived from the stack file, so the file that deployed
/// a stack is the one that can destroy it. Resources that are already gone
/// are skipped, which makes a second `down` after a partial failure safe.
///
/// # Errors
///
/// Returns an error if configuration loading fails or a teardown step fails
/// for a reason other than the resource already being gone.
pub async fn execute(file: &str) -> anyhow::Result<()> {
    let total_start = Instant::now();

    let config = StackConfig::load(Path::new(file))
        .map_err(|e| anyhow::anyhow!("{e}"))?
        .resolve();
    let topology = Topology::from_config(&config);

    eprintln!();
    eprintln!("  Destroying stack {BOLD}{}{RESET}", config.name);
    eprintln!();

    let provisioner = AwsProvisioner::connect(config.region.clone()).await;
    let deployer = Deployer::new(Box::new(provisioner));
    deployer
        .down(&topology)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    eprintln!();
    eprintln!(
        "  {GREEN}{BOLD}Destroyed{RESET} stack {} in {:.1}s",
        config.name,
        total_start.elapsed().as_secs_f64()
    );

    Ok(())
}
