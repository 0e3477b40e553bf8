//! The deployment sequence that drives a topology through a provisioner.

use std::future::Future;

use gantry_common::error::{GantryError, Result};
use gantry_topology::outputs::StackOutputs;
use gantry_topology::topology::Topology;

use crate::provisioner::Provisioner;

/// Drives a topology through a provisioning backend.
///
/// Creation is one fixed linear sequence. Identifiers generated by each step
/// are passed as literal arguments to the steps that consume them; there is
/// no resolution layer in between. The first failure aborts the remaining
/// sequence with no rollback of what was already created.
pub struct Deployer {
    provisioner: Box<dyn Provisioner>,
}

impl Deployer {
    /// Creates a deployer over the given provisioning backend.
    #[must_use]
    pub fn new(provisioner: Box<dyn Provisioner>) -> Self {
        Self { provisioner }
    }

    /// Stands up the whole topology in declaration order and returns the
    /// stack outputs.
    ///
    /// # Errors
    ///
    /// Returns the first provisioning error unchanged; later declarations
    /// are not attempted.
    pub async fn up(&self, topology: &Topology) -> Result<StackOutputs> {
        eprintln!("  Creating cluster '{}'...", topology.cluster.name);
        let cluster = self.provisioner.create_cluster(&topology.cluster).await?;
        tracing::info!(arn = %cluster.arn, "cluster created");

        eprintln!(
            "  Creating load balancer '{}'...",
            topology.load_balancer.name
        );
        let lb = self
            .provisioner
            .create_load_balancer(&topology.load_balancer)
            .await?;
        tracing::info!(arn = %lb.arn, dns_name = %lb.dns_name, "load balancer created");

        eprintln!("  Creating repository '{}'...", topology.repository.name);
        let repository = self
            .provisioner
            .create_repository(&topology.repository)
            .await?;
        tracing::info!(url = %repository.url, "repository created");

        eprintln!("  Building and pushing image '{}'...", topology.image.name);
        let image = self
            .provisioner
            .build_and_push_image(&topology.image, &repository.url)
            .await?;
        tracing::info!(uri = %image.uri, "image pushed");

        eprintln!("  Creating service '{}'...", topology.service.name);
        let service = self
            .provisioner
            .create_service(
                &topology.service,
                &cluster.arn,
                &image.uri,
                &lb.target_group_arn,
            )
            .await?;
        tracing::info!(arn = %service.arn, "service created");

        Ok(StackOutputs::from_dns_name(&lb.dns_name))
    }

    /// Tears the topology down in reverse creation order.
    ///
    /// A resource that no longer exists is skipped; any other failure aborts
    /// the remaining teardown.
    ///
    /// # Errors
    ///
    /// Returns the first non-missing teardown error unchanged.
    pub async fn down(&self, topology: &Topology) -> Result<()> {
        teardown(
            "service",
            &topology.service.name,
            self.provisioner
                .destroy_service(&topology.service, &topology.cluster),
        )
        .await?;
        teardown(
            "repository",
            &topology.repository.name,
            self.provisioner.destroy_repository(&topology.repository),
        )
        .await?;
        teardown(
            "load balancer",
            &topology.load_balancer.name,
            self.provisioner
                .destroy_load_balancer(&topology.load_balancer),
        )
        .await?;
        teardown(
            "cluster",
            &topology.cluster.name,
            self.provisioner.destroy_cluster(&topology.cluster),
        )
        .await?;
        Ok(())
    }
}

/// Runs one teardown step, treating an already-missing resource as done.
async fn teardown<F>(step: &str, name: &str, op: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    eprintln!("  Deleting {step} '{name}'...");
    match op.await {
        Err(GantryError::NotFound { kind, id }) => {
            eprintln!("  {kind} '{id}' already gone, skipping");
            tracing::debug!(kind, id = %id, "resource absent during teardown");
            Ok(())
        }
        other => other,
    }
}
