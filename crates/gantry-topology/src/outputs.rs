//! Identifier handles yielded by provisioned resources, and the stack's
//! exported values.

use gantry_common::types::{Arn, DnsName, ImageUri, RepositoryUrl};
use serde::{Deserialize, Serialize};

/// Identifiers of a provisioned cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOutputs {
    /// Cluster ARN, consumed by the service declaration.
    pub arn: Arn,
}

/// Identifiers of a provisioned load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerOutputs {
    /// Load balancer ARN.
    pub arn: Arn,
    /// Generated public DNS name; the exported URL derives from it.
    pub dns_name: DnsName,
    /// ARN of the default target group, consumed by the service's port
    /// mapping.
    pub target_group_arn: Arn,
}

/// Identifiers of a provisioned image repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOutputs {
    /// Repository URL, consumed by the image build.
    pub url: RepositoryUrl,
}

/// Identifiers of a built and published image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOutputs {
    /// Image URI, consumed by the service's container definition.
    pub uri: ImageUri,
}

/// Identifiers of a provisioned service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOutputs {
    /// Service ARN.
    pub arn: Arn,
}

/// Named values exported once the whole stack is up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutputs {
    /// Public HTTP endpoint of the application, `http://<dns-name>`.
    pub url: String,
}

impl StackOutputs {
    /// Derives the exported values from the load balancer's DNS name.
    #[must_use]
    pub fn from_dns_name(dns_name: &DnsName) -> Self {
        Self {
            url: format!("http://{dns_name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_http_scheme_plus_dns_name_only() {
        let outputs =
            StackOutputs::from_dns_name(&DnsName::new("web-lb-1234.eu-west-1.elb.amazonaws.com"));
        assert_eq!(outputs.url, "http://web-lb-1234.eu-west-1.elb.amazonaws.com");
    }
}
