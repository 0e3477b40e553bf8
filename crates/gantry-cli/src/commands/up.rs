//! `gantry up` — Deploy the stack and print the service URL.

use std::path::Path;
use std::time::Instant;

use gantry_common::config::StackConfig;
use gantry_provision::aws::AwsProvisioner;
use gantry_provision::deployer::Deployer;
use gantry_topology::topology::Topology;

use crate::output::{BOLD, CYAN, DIM, GREEN, RESET};

/// Executes the `up` command.
///
/// Progress goes to stderr; the final URL is also written alone to stdout
/// so scripts can capture it.
///
/// # Errors
///
/// Returns an error if configuration loading or any provisioning step fails.
pub async fn execute(file: &str) -> anyhow::Result<()> {
    let total_start = Instant::now();
    print_header();

    let config = StackConfig::load(Path::new(file))
        .map_err(|e| anyhow::anyhow!("{e}"))?
        .resolve();
    let topology = Topology::from_config(&config);
    let resource_count = topology.plan().len();

    eprintln!("  Deploying stack {BOLD}{}{RESET}", config.name);
    if let Some(ref region) = config.region {
        eprintln!("  {DIM}region: {region}{RESET}");
    }
    eprintln!();

    let provisioner = AwsProvisioner::connect(config.region.clone()).await;
    let deployer = Deployer::new(Box::new(provisioner));
    let outputs = deployer
        .up(&topology)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    eprintln!();
    eprintln!(
        "  {GREEN}{BOLD}Deployed {resource_count}{RESET} resource(s) in {:.1}s",
        total_start.elapsed().as_secs_f64()
    );
    eprintln!();
    eprintln!("  {CYAN}Access at:{RESET} {BOLD}{}{RESET}", outputs.url);
    println!("{}", outputs.url);

    Ok(())
}

fn print_header() {
    eprintln!();
    eprintln!("  {BOLD}Gantry{RESET} {DIM}v{}{RESET}", env!("CARGO_PKG_VERSION"));
    eprintln!();
}
