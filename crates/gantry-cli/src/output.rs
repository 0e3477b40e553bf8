//! Formatted output helpers for CLI commands.
//!
//! Provides the shared ANSI palette and the plan rendering used by the
//! `plan` command.

use std::fmt::Write as _;

use gantry_topology::topology::PlannedResource;

/// Bold text.
pub const BOLD: &str = "\x1b[1m";
/// Dimmed text.
pub const DIM: &str = "\x1b[2m";
/// Green foreground.
pub const GREEN: &str = "\x1b[32m";
/// Cyan foreground.
pub const CYAN: &str = "\x1b[36m";
/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";

/// Renders the creation sequence, one indented block per resource.
#[must_use]
pub fn render_plan(plan: &[PlannedResource]) -> String {
    let mut out = String::new();
    for resource in plan {
        let _ = writeln!(out, "  + {} {}", resource.kind, resource.name);
        for (key, value) in &resource.attributes {
            let _ = writeln!(out, "      {key}: {value}");
        }
    }
    out
}

/// Renders the identifier hand-offs, one `producer -> consumer` line per
/// consumed identifier.
#[must_use]
pub fn render_identifier_flows(plan: &[PlannedResource]) -> String {
    let mut out = String::new();
    for resource in plan {
        for producer in &resource.consumes {
            let _ = writeln!(out, "    {} -> {}", producer, resource.name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use gantry_common::config::ResolvedConfig;
    use gantry_topology::topology::Topology;

    use super::*;

    fn plan() -> Vec<PlannedResource> {
        Topology::from_config(&ResolvedConfig::default()).plan()
    }

    #[test]
    fn render_plan_lists_every_resource_with_its_kind() {
        let rendered = render_plan(&plan());
        assert!(rendered.contains("  + cluster fargate-app-cluster\n"));
        assert!(rendered.contains("  + load balancer fargate-app-lb\n"));
        assert!(rendered.contains("  + repository fargate-app-repo\n"));
        assert!(rendered.contains("  + image fargate-app-image\n"));
        assert!(rendered.contains("  + service fargate-app-service\n"));
    }

    #[test]
    fn render_plan_indents_attributes_under_their_resource() {
        let rendered = render_plan(&plan());
        assert!(rendered.contains("      listener: HTTP :80\n"));
        assert!(rendered.contains("      memory: 128 MiB\n"));
        assert!(rendered.contains("      platform: linux/arm64\n"));
    }

    #[test]
    fn render_identifier_flows_names_producer_and_consumer() {
        let rendered = render_identifier_flows(&plan());
        assert!(rendered.contains("    fargate-app-repo -> fargate-app-image\n"));
        assert!(rendered.contains("    fargate-app-cluster -> fargate-app-service\n"));
        assert!(rendered.contains("    fargate-app-tg -> fargate-app-service\n"));
    }
}
