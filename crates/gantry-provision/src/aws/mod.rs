//! The AWS provisioner.
//!
//! Implements [`Provisioner`] over the official SDK clients. Supporting
//! plumbing a declaration needs on AWS but does not name (default-VPC
//! placement, security groups, the task execution role, listener and target
//! group wiring, task definition registration) is handled inside the
//! corresponding method. Creation calls return as soon as AWS accepts them;
//! waiting for resources to stabilize is the platform's concern.

mod iam;
mod network;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, Compatibility, ContainerDefinition, CpuArchitecture,
    LaunchType, LoadBalancer, NetworkConfiguration, NetworkMode, OsFamily, PortMapping,
    RuntimePlatform, TransportProtocol,
};
use aws_sdk_elasticloadbalancingv2::types::{
    Action, ActionTypeEnum, LoadBalancerSchemeEnum, LoadBalancerTypeEnum, ProtocolEnum,
    TargetTypeEnum,
};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use gantry_common::error::{GantryError, Result};
use gantry_common::types::{Arn, DnsName, ImageUri, RepositoryUrl};
use gantry_image::auth::RegistryAuth;
use gantry_image::docker::DockerCli;
use gantry_image::publish::ImagePublisher;
use gantry_topology::outputs::{
    ClusterOutputs, ImageOutputs, LoadBalancerOutputs, RepositoryOutputs, ServiceOutputs,
};
use gantry_topology::resources::{
    ClusterSpec, ImageSpec, LoadBalancerSpec, RepositorySpec, ServiceSpec,
};

use crate::provisioner::Provisioner;
use self::network::NetworkInfo;

/// Provisioner backed by the AWS control plane.
#[derive(Debug)]
pub struct AwsProvisioner {
    ecs: aws_sdk_ecs::Client,
    ecr: aws_sdk_ecr::Client,
    elb: aws_sdk_elasticloadbalancingv2::Client,
    ec2: aws_sdk_ec2::Client,
    iam: aws_sdk_iam::Client,
    network: OnceCell<NetworkInfo>,
}

impl AwsProvisioner {
    /// Loads credentials and region from the standard environment and
    /// builds the service clients. A region from the stack file overrides
    /// the environment.
    pub async fn connect(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self {
            ecs: aws_sdk_ecs::Client::new(&config),
            ecr: aws_sdk_ecr::Client::new(&config),
            elb: aws_sdk_elasticloadbalancingv2::Client::new(&config),
            ec2: aws_sdk_ec2::Client::new(&config),
            iam: aws_sdk_iam::Client::new(&config),
            network: OnceCell::new(),
        }
    }

    /// Default-VPC network info, discovered once per run.
    async fn network(&self) -> Result<&NetworkInfo> {
        self.network
            .get_or_try_init(|| network::discover_default_network(&self.ec2))
            .await
    }

    async fn delete_target_group(&self, name: &str) -> Result<()> {
        let described = self.elb.describe_target_groups().names(name).send().await;

        let tg_arn = match described {
            Ok(output) => output
                .target_groups()
                .first()
                .and_then(|group| group.target_group_arn())
                .map(ToString::to_string),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_target_group_not_found_exception() {
                    debug!(target_group = name, "target group already gone");
                    return Ok(());
                }
                return Err(GantryError::provision(name, DisplayErrorContext(err)));
            }
        };

        if let Some(tg_arn) = tg_arn {
            let _ = self
                .elb
                .delete_target_group()
                .target_group_arn(&tg_arn)
                .send()
                .await
                .map_err(|e| GantryError::provision(name, DisplayErrorContext(e)))?;
            debug!(target_group = name, "target group deleted");
        }
        Ok(())
    }

    async fn cleanup_security_group(&self, resource_name: &str) {
        match self.network().await {
            Ok(network) => {
                network::delete_security_group(
                    &self.ec2,
                    &network.vpc_id,
                    &security_group_name(resource_name),
                )
                .await;
            }
            Err(e) => warn!(error = %e, "skipping security group cleanup"),
        }
    }
}

#[async_trait]
impl Provisioner for AwsProvisioner {
    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterOutputs> {
        let response = self
            .ecs
            .create_cluster()
            .cluster_name(&spec.name)
            .send()
            .await
            .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;

        let arn = response
            .cluster()
            .and_then(|cluster| cluster.cluster_arn())
            .ok_or_else(|| missing(&spec.name, "cluster ARN"))?;

        debug!(cluster = %spec.name, arn, "cluster accepted");
        Ok(ClusterOutputs { arn: Arn::new(arn) })
    }

    async fn create_load_balancer(&self, spec: &LoadBalancerSpec) -> Result<LoadBalancerOutputs> {
        let network = self.network().await?;
        let sg_id = network::ensure_security_group(
            &self.ec2,
            &network.vpc_id,
            &security_group_name(&spec.name),
            "public ingress to the load balancer listener",
            spec.listener_port,
        )
        .await?;

        let response = self
            .elb
            .create_load_balancer()
            .name(&spec.name)
            .r#type(LoadBalancerTypeEnum::Application)
            .scheme(LoadBalancerSchemeEnum::InternetFacing)
            .set_subnets(Some(network.subnet_ids.clone()))
            .security_groups(&sg_id)
            .send()
            .await
            .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;

        let lb = response
            .load_balancers()
            .first()
            .ok_or_else(|| missing(&spec.name, "load balancer"))?;
        let lb_arn = lb
            .load_balancer_arn()
            .ok_or_else(|| missing(&spec.name, "load balancer ARN"))?;
        let dns_name = lb
            .dns_name()
            .ok_or_else(|| missing(&spec.name, "DNS name"))?;

        let tg = &spec.default_target_group;
        let tg_response = self
            .elb
            .create_target_group()
            .name(&tg.name)
            .port(i32::from(tg.port))
            .protocol(ProtocolEnum::from(tg.protocol.as_str()))
            .target_type(TargetTypeEnum::Ip)
            .vpc_id(&network.vpc_id)
            .send()
            .await
            .map_err(|e| GantryError::provision(&tg.name, DisplayErrorContext(e)))?;

        let tg_arn = tg_response
            .target_groups()
            .first()
            .and_then(|group| group.target_group_arn())
            .ok_or_else(|| missing(&tg.name, "target group ARN"))?;

        let forward = Action::builder()
            .r#type(ActionTypeEnum::Forward)
            .target_group_arn(tg_arn)
            .build()
            .map_err(|e| GantryError::provision(&spec.name, e))?;

        let _ = self
            .elb
            .create_listener()
            .load_balancer_arn(lb_arn)
            .port(i32::from(spec.listener_port))
            .protocol(ProtocolEnum::Http)
            .default_actions(forward)
            .send()
            .await
            .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;

        debug!(lb = %spec.name, dns_name, "load balancer wired");
        Ok(LoadBalancerOutputs {
            arn: Arn::new(lb_arn),
            dns_name: DnsName::new(dns_name),
            target_group_arn: Arn::new(tg_arn),
        })
    }

    async fn create_repository(&self, spec: &RepositorySpec) -> Result<RepositoryOutputs> {
        let response = self
            .ecr
            .create_repository()
            .repository_name(&spec.name)
            .send()
            .await
            .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;

        let url = response
            .repository()
            .and_then(|repository| repository.repository_uri())
            .ok_or_else(|| missing(&spec.name, "repository URI"))?;

        debug!(repository = %spec.name, url, "repository created");
        Ok(RepositoryOutputs {
            url: RepositoryUrl::new(url),
        })
    }

    async fn build_and_push_image(
        &self,
        spec: &ImageSpec,
        repository: &RepositoryUrl,
    ) -> Result<ImageOutputs> {
        let token_response = self
            .ecr
            .get_authorization_token()
            .send()
            .await
            .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;

        let auth_data = token_response
            .authorization_data()
            .first()
            .ok_or_else(|| missing(&spec.name, "registry authorization data"))?;
        let token = auth_data
            .authorization_token()
            .ok_or_else(|| missing(&spec.name, "authorization token"))?;
        let endpoint = auth_data
            .proxy_endpoint()
            .ok_or_else(|| missing(&spec.name, "registry endpoint"))?;
        let auth = RegistryAuth::from_authorization_token(token, endpoint)?;

        let docker = DockerCli::locate()?;
        let uri = ImagePublisher::new(docker)
            .publish(&spec.build_context, &spec.platform, repository, &auth)
            .await?;

        Ok(ImageOutputs { uri })
    }

    async fn create_service(
        &self,
        spec: &ServiceSpec,
        cluster: &Arn,
        image: &ImageUri,
        target_group: &Arn,
    ) -> Result<ServiceOutputs> {
        let network = self.network().await?;
        let sg_id = network::ensure_security_group(
            &self.ec2,
            &network.vpc_id,
            &security_group_name(&spec.name),
            "ingress to the application container port",
            spec.container.container_port,
        )
        .await?;

        let role_arn =
            iam::ensure_execution_role(&self.iam, &execution_role_name(&spec.name)).await?;

        let container = ContainerDefinition::builder()
            .name(&spec.container.name)
            .image(image.as_str())
            .cpu(i32::try_from(spec.container.cpu).unwrap_or(i32::MAX))
            .memory(i32::try_from(spec.container.memory).unwrap_or(i32::MAX))
            .essential(spec.container.essential)
            .port_mappings(
                PortMapping::builder()
                    .container_port(i32::from(spec.container.container_port))
                    .protocol(TransportProtocol::Tcp)
                    .build(),
            )
            .build();

        let platform = RuntimePlatform::builder()
            .operating_system_family(OsFamily::from(spec.runtime_platform.os_family.as_str()))
            .cpu_architecture(CpuArchitecture::from(
                spec.runtime_platform.cpu_architecture.as_str(),
            ))
            .build();

        let task_response = self
            .ecs
            .register_task_definition()
            .family(&spec.name)
            .network_mode(NetworkMode::Awsvpc)
            .requires_compatibilities(Compatibility::Fargate)
            .cpu(spec.container.cpu.to_string())
            .memory(spec.container.memory.to_string())
            .execution_role_arn(&role_arn)
            .runtime_platform(platform)
            .container_definitions(container)
            .send()
            .await
            .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;

        let task_definition_arn = task_response
            .task_definition()
            .and_then(|task| task.task_definition_arn())
            .ok_or_else(|| missing(&spec.name, "task definition ARN"))?;
        debug!(service = %spec.name, task_definition_arn, "task definition registered");

        let vpc_config = AwsVpcConfiguration::builder()
            .set_subnets(Some(network.subnet_ids.clone()))
            .security_groups(&sg_id)
            .assign_public_ip(public_ip(spec.assign_public_ip))
            .build()
            .map_err(|e| GantryError::provision(&spec.name, e))?;

        let response = self
            .ecs
            .create_service()
            .cluster(cluster.as_str())
            .service_name(&spec.name)
            .task_definition(task_definition_arn)
            .desired_count(spec.desired_count)
            .launch_type(LaunchType::Fargate)
            .network_configuration(
                NetworkConfiguration::builder()
                    .awsvpc_configuration(vpc_config)
                    .build(),
            )
            .load_balancers(
                LoadBalancer::builder()
                    .target_group_arn(target_group.as_str())
                    .container_name(&spec.container.name)
                    .container_port(i32::from(spec.container.container_port))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;

        let arn = response
            .service()
            .and_then(|service| service.service_arn())
            .ok_or_else(|| missing(&spec.name, "service ARN"))?;

        debug!(service = %spec.name, arn, "service accepted");
        Ok(ServiceOutputs { arn: Arn::new(arn) })
    }

    async fn destroy_service(&self, spec: &ServiceSpec, cluster: &ClusterSpec) -> Result<()> {
        let result = self
            .ecs
            .delete_service()
            .cluster(&cluster.name)
            .service(&spec.name)
            .force(true)
            .send()
            .await;

        match result {
            Ok(_) => debug!(service = %spec.name, "service deleted"),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_service_not_found_exception() || err.is_cluster_not_found_exception() {
                    return Err(GantryError::NotFound {
                        kind: "service",
                        id: spec.name.clone(),
                    });
                }
                return Err(GantryError::provision(&spec.name, DisplayErrorContext(err)));
            }
        }

        self.cleanup_security_group(&spec.name).await;
        Ok(())
    }

    async fn destroy_repository(&self, spec: &RepositorySpec) -> Result<()> {
        let result = self
            .ecr
            .delete_repository()
            .repository_name(&spec.name)
            .force(spec.force_delete)
            .send()
            .await;

        match result {
            Ok(_) => {
                debug!(repository = %spec.name, "repository deleted");
                Ok(())
            }
            Err(err) => {
                let err = err.into_service_error();
                if err.is_repository_not_found_exception() {
                    return Err(GantryError::NotFound {
                        kind: "repository",
                        id: spec.name.clone(),
                    });
                }
                Err(GantryError::provision(&spec.name, DisplayErrorContext(err)))
            }
        }
    }

    async fn destroy_load_balancer(&self, spec: &LoadBalancerSpec) -> Result<()> {
        let described = self
            .elb
            .describe_load_balancers()
            .names(&spec.name)
            .send()
            .await;

        let lb_arn = match described {
            Ok(output) => output
                .load_balancers()
                .first()
                .and_then(|lb| lb.load_balancer_arn())
                .map(ToString::to_string),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_load_balancer_not_found_exception() {
                    return Err(GantryError::NotFound {
                        kind: "load balancer",
                        id: spec.name.clone(),
                    });
                }
                return Err(GantryError::provision(&spec.name, DisplayErrorContext(err)));
            }
        };
        let Some(lb_arn) = lb_arn else {
            return Err(GantryError::NotFound {
                kind: "load balancer",
                id: spec.name.clone(),
            });
        };

        // Listeners go first so the target group is unreferenced by the
        // time its own delete call arrives.
        let listeners = self
            .elb
            .describe_listeners()
            .load_balancer_arn(&lb_arn)
            .send()
            .await
            .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;
        for listener in listeners.listeners() {
            if let Some(listener_arn) = listener.listener_arn() {
                let _ = self
                    .elb
                    .delete_listener()
                    .listener_arn(listener_arn)
                    .send()
                    .await
                    .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;
            }
        }

        self.delete_target_group(&spec.default_target_group.name)
            .await?;

        let _ = self
            .elb
            .delete_load_balancer()
            .load_balancer_arn(&lb_arn)
            .send()
            .await
            .map_err(|e| GantryError::provision(&spec.name, DisplayErrorContext(e)))?;
        debug!(lb = %spec.name, "load balancer deleted");

        self.cleanup_security_group(&spec.name).await;
        Ok(())
    }

    async fn destroy_cluster(&self, spec: &ClusterSpec) -> Result<()> {
        let result = self.ecs.delete_cluster().cluster(&spec.name).send().await;

        match result {
            Ok(_) => {
                debug!(cluster = %spec.name, "cluster deleted");
                Ok(())
            }
            Err(err) => {
                let err = err.into_service_error();
                if err.is_cluster_not_found_exception() {
                    return Err(GantryError::NotFound {
                        kind: "cluster",
                        id: spec.name.clone(),
                    });
                }
                Err(GantryError::provision(&spec.name, DisplayErrorContext(err)))
            }
        }
    }
}

/// Name of the ingress security group owned by a resource.
fn security_group_name(resource: &str) -> String {
    format!("{resource}-sg")
}

/// Name of the task execution role owned by a service.
fn execution_role_name(service: &str) -> String {
    format!("{service}-task-exec-role")
}

fn public_ip(assign: bool) -> AssignPublicIp {
    if assign {
        AssignPublicIp::Enabled
    } else {
        AssignPublicIp::Disabled
    }
}

fn missing(resource: &str, what: &str) -> GantryError {
    GantryError::provision(resource, format!("response carried no {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_plumbing_names_derive_from_the_resource() {
        assert_eq!(security_group_name("demo-lb"), "demo-lb-sg");
        assert_eq!(
            execution_role_name("demo-service"),
            "demo-service-task-exec-role"
        );
    }

    #[test]
    fn public_ip_assignment_maps_to_the_platform_enum() {
        assert_eq!(public_ip(true), AssignPublicIp::Enabled);
        assert_eq!(public_ip(false), AssignPublicIp::Disabled);
    }

    #[test]
    fn missing_response_fields_name_the_resource() {
        let err = missing("demo-cluster", "cluster ARN");
        assert_eq!(
            err.to_string(),
            "provisioning demo-cluster failed: response carried no cluster ARN"
        );
    }
}
