//! The five resource declarations that make up a gantry stack.
//!
//! Declarations carry only what the user controls. Identifiers generated by
//! the platform (ARNs, URLs, DNS names) are not part of a declaration; they
//! are produced during provisioning and threaded into later declarations as
//! call arguments.

use std::path::PathBuf;

use gantry_common::constants;
use serde::{Deserialize, Serialize};

/// A compute cluster to deploy into. No inbound configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Cluster name.
    pub name: String,
}

/// The default target group owned by the load balancer.
///
/// Receives traffic from the public listener and forwards it to the service
/// tasks on the application port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroupSpec {
    /// Target group name.
    pub name: String,
    /// Port on which targets receive traffic. Must equal the container port
    /// of the service's port mapping; the assembler writes the same
    /// configuration value into both.
    pub port: u16,
    /// Target protocol.
    pub protocol: String,
}

/// An internet-facing load balancer serving the container endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerSpec {
    /// Load balancer name.
    pub name: String,
    /// Port of the public HTTP listener. The exported URL carries no port.
    pub listener_port: u16,
    /// Default target group; the service's port mapping attaches to it.
    pub default_target_group: TargetGroupSpec,
}

/// A container-image repository to publish the application image into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySpec {
    /// Repository name.
    pub name: String,
    /// Whether deletion removes the repository even while it holds images.
    pub force_delete: bool,
}

/// A container image built from a local context and pushed into the
/// repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    /// Image name, used for logging only; the pushed image is addressed by
    /// the repository URL.
    pub name: String,
    /// Local build context directory.
    pub build_context: PathBuf,
    /// Target platform, e.g. `linux/arm64`.
    pub platform: String,
}

/// The single application container of the task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Container name inside the task definition.
    pub name: String,
    /// CPU units reserved for the container.
    pub cpu: u32,
    /// Memory in MiB reserved for the container.
    pub memory: u32,
    /// Port the container listens on; mapped to the target group.
    pub container_port: u16,
    /// Whether the task dies when this container exits.
    pub essential: bool,
}

/// Runtime platform of the service tasks.
///
/// ARM images require this to be set on the service as well; the image
/// platform alone is not sufficient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimePlatform {
    /// Operating system family, e.g. `LINUX`.
    pub os_family: String,
    /// CPU architecture, e.g. `ARM64`.
    pub cpu_architecture: String,
}

impl Default for RuntimePlatform {
    fn default() -> Self {
        Self {
            os_family: constants::OS_FAMILY.to_string(),
            cpu_architecture: constants::CPU_ARCHITECTURE.to_string(),
        }
    }
}

/// A service running the application container on the cluster, attached to
/// the load balancer's target group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Service name.
    pub name: String,
    /// The application container definition.
    pub container: ContainerSpec,
    /// Runtime platform of the tasks.
    pub runtime_platform: RuntimePlatform,
    /// Whether tasks get a public IP. Without a private network path this
    /// must stay enabled for image pulls and listener traffic to work.
    pub assign_public_ip: bool,
    /// Number of tasks kept running.
    pub desired_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_platform_defaults_to_linux_arm64() {
        let platform = RuntimePlatform::default();
        assert_eq!(platform.os_family, "LINUX");
        assert_eq!(platform.cpu_architecture, "ARM64");
    }
}
