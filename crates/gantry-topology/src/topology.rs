//! Topology assembly: from a resolved configuration to the five declarations.
//!
//! The assembler threads each configuration value exactly once. In
//! particular the application container port is written into both the target
//! group and the service's port mapping from the same field, which is what
//! keeps the two in agreement — there is no separate validation step.

use std::fmt;
use std::path::PathBuf;

use gantry_common::config::ResolvedConfig;
use gantry_common::constants;
use serde::{Deserialize, Serialize};

use crate::resources::{
    ClusterSpec, ContainerSpec, ImageSpec, LoadBalancerSpec, RepositorySpec, RuntimePlatform,
    ServiceSpec, TargetGroupSpec,
};

/// The declared deployment topology: five resources in a fixed creation
/// order, later ones consuming identifiers generated by earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// The compute cluster. Independent leaf.
    pub cluster: ClusterSpec,
    /// The internet-facing load balancer. Independent leaf.
    pub load_balancer: LoadBalancerSpec,
    /// The image repository. Independent leaf.
    pub repository: RepositorySpec,
    /// The image build; consumes the repository URL.
    pub image: ImageSpec,
    /// The service; consumes the cluster ARN, the image URI, and the target
    /// group ARN. Created last.
    pub service: ServiceSpec,
}

impl Topology {
    /// Assembles the topology from a resolved stack configuration.
    #[must_use]
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let stack = &config.name;
        Self {
            cluster: ClusterSpec {
                name: format!("{stack}-cluster"),
            },
            load_balancer: LoadBalancerSpec {
                name: format!("{stack}-lb"),
                listener_port: constants::LISTENER_PORT,
                default_target_group: TargetGroupSpec {
                    name: format!("{stack}-tg"),
                    port: config.app_container_port,
                    protocol: "HTTP".to_string(),
                },
            },
            repository: RepositorySpec {
                name: format!("{stack}-repo"),
                force_delete: true,
            },
            image: ImageSpec {
                name: format!("{stack}-image"),
                build_context: PathBuf::from(constants::BUILD_CONTEXT),
                platform: constants::IMAGE_PLATFORM.to_string(),
            },
            service: ServiceSpec {
                name: format!("{stack}-service"),
                container: ContainerSpec {
                    name: constants::CONTAINER_NAME.to_string(),
                    cpu: config.cpu,
                    memory: config.memory,
                    container_port: config.app_container_port,
                    essential: true,
                },
                runtime_platform: RuntimePlatform::default(),
                assign_public_ip: true,
                desired_count: constants::DESIRED_COUNT,
            },
        }
    }

    /// Renders the fixed creation sequence for display.
    ///
    /// Each entry lists the declared attributes and the earlier resources
    /// whose generated identifiers it consumes. The order is the creation
    /// order; nothing is computed from a graph.
    #[must_use]
    pub fn plan(&self) -> Vec<PlannedResource> {
        vec![
            PlannedResource {
                kind: ResourceKind::Cluster,
                name: self.cluster.name.clone(),
                attributes: Vec::new(),
                consumes: Vec::new(),
            },
            PlannedResource {
                kind: ResourceKind::LoadBalancer,
                name: self.load_balancer.name.clone(),
                attributes: vec![
                    (
                        "listener",
                        format!("HTTP :{}", self.load_balancer.listener_port),
                    ),
                    (
                        "target group",
                        format!(
                            "{} ({} :{})",
                            self.load_balancer.default_target_group.name,
                            self.load_balancer.default_target_group.protocol,
                            self.load_balancer.default_target_group.port
                        ),
                    ),
                ],
                consumes: Vec::new(),
            },
            PlannedResource {
                kind: ResourceKind::Repository,
                name: self.repository.name.clone(),
                attributes: vec![("force delete", self.repository.force_delete.to_string())],
                consumes: Vec::new(),
            },
            PlannedResource {
                kind: ResourceKind::Image,
                name: self.image.name.clone(),
                attributes: vec![
                    ("context", self.image.build_context.display().to_string()),
                    ("platform", self.image.platform.clone()),
                ],
                consumes: vec![self.repository.name.clone()],
            },
            PlannedResource {
                kind: ResourceKind::Service,
                name: self.service.name.clone(),
                attributes: vec![
                    ("container", self.service.container.name.clone()),
                    ("cpu", self.service.container.cpu.to_string()),
                    ("memory", format!("{} MiB", self.service.container.memory)),
                    ("port", self.service.container.container_port.to_string()),
                    (
                        "platform",
                        format!(
                            "{}/{}",
                            self.service.runtime_platform.os_family,
                            self.service.runtime_platform.cpu_architecture
                        ),
                    ),
                    (
                        "public ip",
                        self.service.assign_public_ip.to_string(),
                    ),
                ],
                consumes: vec![
                    self.cluster.name.clone(),
                    self.image.name.clone(),
                    self.load_balancer.default_target_group.name.clone(),
                ],
            },
        ]
    }
}

/// Kind of a declared resource, in display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Compute cluster.
    Cluster,
    /// Internet-facing load balancer with its default target group.
    LoadBalancer,
    /// Container-image repository.
    Repository,
    /// Locally-built container image.
    Image,
    /// The running service.
    Service,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster => write!(f, "cluster"),
            Self::LoadBalancer => write!(f, "load balancer"),
            Self::Repository => write!(f, "repository"),
            Self::Image => write!(f, "image"),
            Self::Service => write!(f, "service"),
        }
    }
}

/// One entry of the rendered creation sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedResource {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Resource name.
    pub name: String,
    /// Declared attributes, in display order.
    pub attributes: Vec<(&'static str, String)>,
    /// Names of earlier resources whose generated identifiers this one
    /// consumes.
    pub consumes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use gantry_common::config::StackConfig;

    use super::*;

    fn config(port: Option<u16>, cpu: Option<u32>, memory: Option<u32>) -> ResolvedConfig {
        StackConfig {
            name: Some("web".into()),
            region: None,
            app_container_port: port,
            cpu,
            memory,
        }
        .resolve()
    }

    #[test]
    fn target_group_port_always_equals_container_port() {
        for port in [None, Some(80), Some(3000), Some(9090)] {
            let topology = Topology::from_config(&config(port, None, None));
            assert_eq!(
                topology.load_balancer.default_target_group.port,
                topology.service.container.container_port,
            );
        }
    }

    #[test]
    fn defaults_flow_into_declarations() {
        let topology = Topology::from_config(&config(None, None, None));
        assert_eq!(topology.load_balancer.default_target_group.port, 8080);
        assert_eq!(topology.service.container.cpu, 512);
        assert_eq!(topology.service.container.memory, 128);
    }

    #[test]
    fn configured_values_flow_into_declarations() {
        let topology = Topology::from_config(&config(Some(9090), Some(256), Some(512)));
        assert_eq!(topology.load_balancer.default_target_group.port, 9090);
        assert_eq!(topology.service.container.container_port, 9090);
        assert_eq!(topology.service.container.cpu, 256);
        assert_eq!(topology.service.container.memory, 512);
    }

    #[test]
    fn fixed_attributes_are_not_configurable() {
        let topology = Topology::from_config(&config(Some(9090), Some(256), Some(512)));
        assert_eq!(topology.service.container.name, "app");
        assert!(topology.service.container.essential);
        assert!(topology.service.assign_public_ip);
        assert_eq!(topology.service.desired_count, 1);
        assert_eq!(topology.image.platform, "linux/arm64");
        assert_eq!(topology.image.build_context, PathBuf::from("./app"));
        assert!(topology.repository.force_delete);
        assert_eq!(topology.load_balancer.listener_port, 80);
        assert_eq!(topology.service.runtime_platform.os_family, "LINUX");
        assert_eq!(topology.service.runtime_platform.cpu_architecture, "ARM64");
    }

    #[test]
    fn resource_names_share_the_stack_prefix() {
        let topology = Topology::from_config(&config(None, None, None));
        assert_eq!(topology.cluster.name, "web-cluster");
        assert_eq!(topology.load_balancer.name, "web-lb");
        assert_eq!(topology.load_balancer.default_target_group.name, "web-tg");
        assert_eq!(topology.repository.name, "web-repo");
        assert_eq!(topology.image.name, "web-image");
        assert_eq!(topology.service.name, "web-service");
    }

    #[test]
    fn plan_lists_resources_in_creation_order() {
        let topology = Topology::from_config(&config(None, None, None));
        let kinds: Vec<ResourceKind> = topology.plan().iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::Cluster,
                ResourceKind::LoadBalancer,
                ResourceKind::Repository,
                ResourceKind::Image,
                ResourceKind::Service,
            ]
        );
    }

    #[test]
    fn plan_threads_identifiers_between_declarations() {
        let topology = Topology::from_config(&config(None, None, None));
        let plan = topology.plan();

        let image = plan
            .iter()
            .find(|p| p.kind == ResourceKind::Image)
            .expect("image planned");
        assert_eq!(image.consumes, vec!["web-repo"]);

        let service = plan
            .iter()
            .find(|p| p.kind == ResourceKind::Service)
            .expect("service planned");
        assert_eq!(service.consumes, vec!["web-cluster", "web-image", "web-tg"]);
    }

    #[test]
    fn plan_shows_the_configured_port_on_both_sides() {
        let topology = Topology::from_config(&config(Some(9090), None, None));
        let plan = topology.plan();

        let lb = &plan[1];
        assert!(
            lb.attributes.iter().any(|(_, v)| v.contains(":9090")),
            "target group attribute should show port 9090: {:?}",
            lb.attributes
        );

        let service = &plan[4];
        assert!(
            service
                .attributes
                .iter()
                .any(|(k, v)| *k == "port" && v == "9090"),
            "service attributes should show port 9090: {:?}",
            service.attributes
        );
    }
}
