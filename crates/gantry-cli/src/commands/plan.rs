//! `gantry plan` — Display the declared resources before deploying.

use std::path::Path;

use gantry_common::config::StackConfig;
use gantry_topology::topology::Topology;

/// Executes the `plan` command.
///
/// Loads the stack file, resolves defaults, assembles the topology, and
/// displays the creation sequence. Nothing is contacted; the plan is a pure
/// function of the configuration.
///
/// # Errors
///
/// Returns an error if the stack file exists but cannot be read or parsed.
pub fn execute(file: &str) -> anyhow::Result<()> {
    let config = StackConfig::load(Path::new(file))
        .map_err(|e| anyhow::anyhow!("{e}"))?
        .resolve();
    let topology = Topology::from_config(&config);
    let plan = topology.plan();

    println!("Deployment Plan for: {}", config.name);
    println!(
        "\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"
    );
    println!();

    print!("{}", crate::output::render_plan(&plan));

    println!();
    println!("  {} resource(s) will be deployed.", plan.len());

    let flows = crate::output::render_identifier_flows(&plan);
    if !flows.is_empty() {
        println!();
        println!("  Identifier flow:");
        print!("{flows}");
    }

    Ok(())
}
