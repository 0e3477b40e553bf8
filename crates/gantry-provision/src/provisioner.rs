//! Provisioning platform abstraction.

use async_trait::async_trait;

use gantry_common::error::Result;
use gantry_common::types::{Arn, ImageUri, RepositoryUrl};
use gantry_topology::outputs::{
    ClusterOutputs, ImageOutputs, LoadBalancerOutputs, RepositoryOutputs, ServiceOutputs,
};
use gantry_topology::resources::{
    ClusterSpec, ImageSpec, LoadBalancerSpec, RepositorySpec, ServiceSpec,
};

/// Platform-agnostic provisioning backend.
///
/// One method per declared resource kind. Each creation call either succeeds
/// and returns the identifiers later declarations consume, or fails; the
/// caller decides what failure means for the rest of the sequence.
/// Implementors may create supporting plumbing (network wiring, roles) inside
/// a method; such plumbing is theirs to manage and never surfaces as outputs.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Creates the compute cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster cannot be created.
    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterOutputs>;

    /// Creates the internet-facing load balancer together with its listener
    /// and default target group.
    ///
    /// # Errors
    ///
    /// Returns an error if the load balancer or its wiring cannot be created.
    async fn create_load_balancer(&self, spec: &LoadBalancerSpec) -> Result<LoadBalancerOutputs>;

    /// Creates the container image repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be created.
    async fn create_repository(&self, spec: &RepositorySpec) -> Result<RepositoryOutputs>;

    /// Builds the image from its local context and pushes it into the
    /// repository created earlier in the sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if registry login, the build, or the push fails.
    async fn build_and_push_image(
        &self,
        spec: &ImageSpec,
        repository: &RepositoryUrl,
    ) -> Result<ImageOutputs>;

    /// Creates the service on the cluster, running the pushed image and
    /// attached to the load balancer's target group.
    ///
    /// # Errors
    ///
    /// Returns an error if the task definition or the service cannot be
    /// created.
    async fn create_service(
        &self,
        spec: &ServiceSpec,
        cluster: &Arn,
        image: &ImageUri,
        target_group: &Arn,
    ) -> Result<ServiceOutputs>;

    /// Deletes the service from its cluster.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the service or its cluster no longer
    /// exists, or another error if deletion fails.
    async fn destroy_service(&self, spec: &ServiceSpec, cluster: &ClusterSpec) -> Result<()>;

    /// Deletes the repository, including its images when the declaration is
    /// force-deletable.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the repository no longer exists, or
    /// another error if deletion fails.
    async fn destroy_repository(&self, spec: &RepositorySpec) -> Result<()>;

    /// Deletes the load balancer together with its listener and target group.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the load balancer no longer exists, or
    /// another error if deletion fails.
    async fn destroy_load_balancer(&self, spec: &LoadBalancerSpec) -> Result<()>;

    /// Deletes the cluster.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the cluster no longer exists, or another
    /// error if deletion fails.
    async fn destroy_cluster(&self, spec: &ClusterSpec) -> Result<()>;
}
