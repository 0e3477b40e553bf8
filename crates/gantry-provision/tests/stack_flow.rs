//! End-to-end tests for the stack pipeline.
//!
//! These tests verify the full flow from a stack file to provisioning calls:
//! 1. Load and resolve the YAML stack configuration
//! 2. Assemble the topology from resolved values
//! 3. Deploy through a provisioner, threading generated identifiers
//! 4. Export the stack URL
//! 5. Tear down cleanly when the platform holds nothing

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use gantry_common::config::StackConfig;
use gantry_common::error::{GantryError, Result};
use gantry_common::types::{Arn, DnsName, ImageUri, RepositoryUrl};
use gantry_provision::deployer::Deployer;
use gantry_provision::provisioner::Provisioner;
use gantry_topology::outputs::{
    ClusterOutputs, ImageOutputs, LoadBalancerOutputs, RepositoryOutputs, ServiceOutputs,
};
use gantry_topology::resources::{
    ClusterSpec, ImageSpec, LoadBalancerSpec, RepositorySpec, ServiceSpec,
};
use gantry_topology::topology::Topology;

const LB_DNS: &str = "stack-lb-87654321.eu-west-1.elb.amazonaws.com";
const REPO_URL: &str = "555566667777.dkr.ecr.eu-west-1.amazonaws.com/stack-repo";

/// What the fake platform was asked to create, exactly as received.
#[derive(Default, Clone)]
struct Seen {
    cluster: Option<ClusterSpec>,
    load_balancer: Option<LoadBalancerSpec>,
    repository: Option<RepositorySpec>,
    image: Option<(ImageSpec, RepositoryUrl)>,
    service: Option<(ServiceSpec, Arn, ImageUri, Arn)>,
}

#[derive(Default)]
struct CapturingProvisioner {
    seen: Mutex<Seen>,
    empty_platform: bool,
}

impl CapturingProvisioner {
    fn empty_platform() -> Self {
        Self {
            empty_platform: true,
            ..Self::default()
        }
    }

    fn seen(&self) -> Seen {
        self.seen.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl Provisioner for Arc<CapturingProvisioner> {
    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterOutputs> {
        self.seen.lock().expect("lock poisoned").cluster = Some(spec.clone());
        Ok(ClusterOutputs {
            arn: Arn::new(format!(
                "arn:aws:ecs:eu-west-1:555566667777:cluster/{}",
                spec.name
            )),
        })
    }

    async fn create_load_balancer(&self, spec: &LoadBalancerSpec) -> Result<LoadBalancerOutputs> {
        self.seen.lock().expect("lock poisoned").load_balancer = Some(spec.clone());
        Ok(LoadBalancerOutputs {
            arn: Arn::new(format!(
                "arn:aws:elasticloadbalancing:eu-west-1:555566667777:loadbalancer/app/{}/aaa",
                spec.name
            )),
            dns_name: DnsName::new(LB_DNS),
            target_group_arn: Arn::new(format!(
                "arn:aws:elasticloadbalancing:eu-west-1:555566667777:targetgroup/{}/bbb",
                spec.default_target_group.name
            )),
        })
    }

    async fn create_repository(&self, spec: &RepositorySpec) -> Result<RepositoryOutputs> {
        self.seen.lock().expect("lock poisoned").repository = Some(spec.clone());
        Ok(RepositoryOutputs {
            url: RepositoryUrl::new(REPO_URL),
        })
    }

    async fn build_and_push_image(
        &self,
        spec: &ImageSpec,
        repository: &RepositoryUrl,
    ) -> Result<ImageOutputs> {
        self.seen.lock().expect("lock poisoned").image = Some((spec.clone(), repository.clone()));
        Ok(ImageOutputs {
            uri: ImageUri::new(format!("{repository}@sha256:0123abcd")),
        })
    }

    async fn create_service(
        &self,
        spec: &ServiceSpec,
        cluster: &Arn,
        image: &ImageUri,
        target_group: &Arn,
    ) -> Result<ServiceOutputs> {
        self.seen.lock().expect("lock poisoned").service = Some((
            spec.clone(),
            cluster.clone(),
            image.clone(),
            target_group.clone(),
        ));
        Ok(ServiceOutputs {
            arn: Arn::new(format!(
                "arn:aws:ecs:eu-west-1:555566667777:service/{}",
                spec.name
            )),
        })
    }

    async fn destroy_service(&self, spec: &ServiceSpec, _cluster: &ClusterSpec) -> Result<()> {
        if self.empty_platform {
            return Err(GantryError::NotFound {
                kind: "service",
                id: spec.name.clone(),
            });
        }
        Ok(())
    }

    async fn destroy_repository(&self, spec: &RepositorySpec) -> Result<()> {
        if self.empty_platform {
            return Err(GantryError::NotFound {
                kind: "repository",
                id: spec.name.clone(),
            });
        }
        Ok(())
    }

    async fn destroy_load_balancer(&self, spec: &LoadBalancerSpec) -> Result<()> {
        if self.empty_platform {
            return Err(GantryError::NotFound {
                kind: "load balancer",
                id: spec.name.clone(),
            });
        }
        Ok(())
    }

    async fn destroy_cluster(&self, spec: &ClusterSpec) -> Result<()> {
        if self.empty_platform {
            return Err(GantryError::NotFound {
                kind: "cluster",
                id: spec.name.clone(),
            });
        }
        Ok(())
    }
}

fn topology_from(path: &Path) -> Topology {
    let config = StackConfig::load(path)
        .expect("stack file should load")
        .resolve();
    Topology::from_config(&config)
}

async fn deploy(topology: &Topology) -> (Seen, String) {
    let provisioner = Arc::new(CapturingProvisioner::default());
    let deployer = Deployer::new(Box::new(provisioner.clone()));
    let outputs = deployer.up(topology).await.expect("up should succeed");
    (provisioner.seen(), outputs.url)
}

// ── Configuration to declarations ────────────────────────────────────

#[tokio::test]
async fn pipeline_stack_file_values_flow_into_the_service() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gantry.yaml");
    std::fs::write(
        &path,
        "name: orders\napp_container_port: 9090\ncpu: 256\nmemory: 512\n",
    )
    .expect("write stack file");

    let (seen, _) = deploy(&topology_from(&path)).await;

    let (service, _, _, _) = seen.service.expect("service should be created");
    assert_eq!(service.name, "orders-service");
    assert_eq!(service.container.cpu, 256);
    assert_eq!(service.container.memory, 512);
    assert_eq!(service.container.container_port, 9090);

    let lb = seen.load_balancer.expect("load balancer should be created");
    assert_eq!(lb.default_target_group.port, 9090);
    assert_eq!(lb.default_target_group.port, service.container.container_port);
}

#[tokio::test]
async fn pipeline_defaults_flow_when_stack_file_is_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing.yaml");

    let (seen, _) = deploy(&topology_from(&path)).await;

    let (service, _, _, _) = seen.service.expect("service should be created");
    assert_eq!(service.container.container_port, 8080);
    assert_eq!(service.container.cpu, 512);
    assert_eq!(service.container.memory, 128);
    assert_eq!(service.container.name, "app");
    assert_eq!(service.runtime_platform.os_family, "LINUX");
    assert_eq!(service.runtime_platform.cpu_architecture, "ARM64");
    assert!(service.assign_public_ip);

    let image = seen.image.expect("image should be built").0;
    assert_eq!(image.platform, "linux/arm64");
    assert_eq!(image.build_context, Path::new("./app"));

    let repository = seen.repository.expect("repository should be created");
    assert!(repository.force_delete);
}

#[tokio::test]
async fn pipeline_zero_config_values_fall_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gantry.yaml");
    std::fs::write(&path, "app_container_port: 0\ncpu: 0\nmemory: 0\n").expect("write stack file");

    let (seen, _) = deploy(&topology_from(&path)).await;

    let (service, _, _, _) = seen.service.expect("service should be created");
    assert_eq!(service.container.container_port, 8080);
    assert_eq!(service.container.cpu, 512);
    assert_eq!(service.container.memory, 128);
}

// ── Identifier threading ─────────────────────────────────────────────

#[tokio::test]
async fn pipeline_image_step_consumes_the_repository_and_feeds_the_service() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (seen, _) = deploy(&topology_from(&dir.path().join("none.yaml"))).await;

    let (_, repository) = seen.image.expect("image should be built");
    assert_eq!(repository.as_str(), REPO_URL);

    let (_, cluster, image, target_group) = seen.service.expect("service should be created");
    assert_eq!(image.as_str(), format!("{REPO_URL}@sha256:0123abcd"));
    assert!(cluster.as_str().contains(":cluster/fargate-app-cluster"));
    assert!(target_group.as_str().contains("targetgroup/fargate-app-tg"));
}

// ── Stack outputs ────────────────────────────────────────────────────

#[tokio::test]
async fn pipeline_url_export_is_http_over_the_dns_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_, url) = deploy(&topology_from(&dir.path().join("none.yaml"))).await;

    assert_eq!(url, format!("http://{LB_DNS}"));
}

// ── Teardown ─────────────────────────────────────────────────────────

#[tokio::test]
async fn pipeline_down_on_an_empty_platform_is_clean() {
    let dir = tempfile::tempdir().expect("tempdir");
    let topology = topology_from(&dir.path().join("none.yaml"));

    let provisioner = Arc::new(CapturingProvisioner::empty_platform());
    let deployer = Deployer::new(Box::new(provisioner));

    deployer
        .down(&topology)
        .await
        .expect("down with nothing deployed should succeed");
}
