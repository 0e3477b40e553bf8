//! Default-VPC network discovery and security group plumbing.
//!
//! None of this surfaces as declared resources. Tasks and the load balancer
//! are placed into the account's default VPC and reached over public IPs,
//! so the only network objects managed here are the two ingress groups.

use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{Filter, IpPermission, IpRange};
use aws_sdk_ec2::Client;
use tracing::{debug, warn};

use gantry_common::error::{GantryError, Result};

/// Where stack resources are placed: the default VPC and all of its subnets.
#[derive(Debug, Clone)]
pub(crate) struct NetworkInfo {
    /// Default VPC of the account and region.
    pub vpc_id: String,
    /// Every subnet of the default VPC; the load balancer and the tasks
    /// span all of them.
    pub subnet_ids: Vec<String>,
}

/// Finds the default VPC and its subnets.
pub(crate) async fn discover_default_network(ec2: &Client) -> Result<NetworkInfo> {
    let vpcs = ec2
        .describe_vpcs()
        .send()
        .await
        .map_err(|e| GantryError::provision("network", DisplayErrorContext(e)))?;

    let vpc_id = vpcs
        .vpcs()
        .iter()
        .find(|vpc| vpc.is_default().unwrap_or(false))
        .and_then(|vpc| vpc.vpc_id())
        .ok_or(GantryError::NotFound {
            kind: "default VPC",
            id: "none in this account and region".to_string(),
        })?
        .to_string();

    let subnets = ec2
        .describe_subnets()
        .filters(Filter::builder().name("vpc-id").values(&vpc_id).build())
        .send()
        .await
        .map_err(|e| GantryError::provision("network", DisplayErrorContext(e)))?;

    let subnet_ids: Vec<String> = subnets
        .subnets()
        .iter()
        .filter_map(|subnet| subnet.subnet_id())
        .map(ToString::to_string)
        .collect();

    if subnet_ids.is_empty() {
        return Err(GantryError::NotFound {
            kind: "subnets",
            id: format!("default VPC {vpc_id} has none"),
        });
    }

    debug!(vpc_id = %vpc_id, subnets = subnet_ids.len(), "default network discovered");
    Ok(NetworkInfo { vpc_id, subnet_ids })
}

/// Creates (or reuses) a security group allowing TCP ingress on one port
/// from anywhere, and returns its ID.
pub(crate) async fn ensure_security_group(
    ec2: &Client,
    vpc_id: &str,
    name: &str,
    description: &str,
    ingress_port: u16,
) -> Result<String> {
    let existing = ec2
        .describe_security_groups()
        .filters(Filter::builder().name("group-name").values(name).build())
        .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
        .send()
        .await
        .map_err(|e| GantryError::provision(name, DisplayErrorContext(e)))?;

    if let Some(id) = existing
        .security_groups()
        .first()
        .and_then(|group| group.group_id())
    {
        debug!(group = name, id, "reusing security group");
        return Ok(id.to_string());
    }

    let created = ec2
        .create_security_group()
        .group_name(name)
        .description(description)
        .vpc_id(vpc_id)
        .send()
        .await
        .map_err(|e| GantryError::provision(name, DisplayErrorContext(e)))?;

    let group_id = created
        .group_id()
        .ok_or_else(|| GantryError::provision(name, "security group response carried no ID"))?
        .to_string();

    let permission = IpPermission::builder()
        .ip_protocol("tcp")
        .from_port(i32::from(ingress_port))
        .to_port(i32::from(ingress_port))
        .ip_ranges(IpRange::builder().cidr_ip("0.0.0.0/0").build())
        .build();

    let _ = ec2
        .authorize_security_group_ingress()
        .group_id(&group_id)
        .ip_permissions(permission)
        .send()
        .await
        .map_err(|e| GantryError::provision(name, DisplayErrorContext(e)))?;

    debug!(group = name, id = %group_id, port = ingress_port, "security group created");
    Ok(group_id)
}

/// Deletes a security group by name if it still exists.
///
/// Group deletion can be refused while network interfaces of draining tasks
/// still reference it, and the teardown sequence does not wait for those.
/// Failure here is reported and swallowed; the group is internal plumbing,
/// not a declared resource.
pub(crate) async fn delete_security_group(ec2: &Client, vpc_id: &str, name: &str) {
    let found = ec2
        .describe_security_groups()
        .filters(Filter::builder().name("group-name").values(name).build())
        .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
        .send()
        .await;

    let group_id = match found {
        Ok(output) => output
            .security_groups()
            .first()
            .and_then(|group| group.group_id())
            .map(ToString::to_string),
        Err(e) => {
            warn!(group = name, error = %DisplayErrorContext(e), "security group lookup failed");
            return;
        }
    };

    let Some(group_id) = group_id else {
        debug!(group = name, "security group already gone");
        return;
    };

    if let Err(e) = ec2
        .delete_security_group()
        .group_id(&group_id)
        .send()
        .await
    {
        warn!(
            group = name,
            id = %group_id,
            error = %DisplayErrorContext(e),
            "security group not deleted, remove it manually once the tasks are gone"
        );
    } else {
        debug!(group = name, id = %group_id, "security group deleted");
    }
}
