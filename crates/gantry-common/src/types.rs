//! Domain primitive types used across the gantry workspace.
//!
//! All of these are opaque handles generated by the provisioning platform;
//! gantry threads them between declarations but never parses them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Amazon Resource Name identifying a provisioned resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arn(String);

impl Arn {
    /// Creates an ARN from a string value.
    #[must_use]
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public DNS name generated for a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnsName(String);

impl DnsName {
    /// Creates a DNS name from a string value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// URL of a container image repository, used as the image name prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryUrl(String);

impl RepositoryUrl {
    /// Creates a repository URL from a string value.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the registry host part (everything before the first `/`).
    #[must_use]
    pub fn registry(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified container image URI, tag- or digest-pinned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageUri(String);

impl ImageUri {
    /// Creates an image URI from a string value.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_url_registry_strips_repository_path() {
        let url = RepositoryUrl::new("123456789012.dkr.ecr.eu-west-1.amazonaws.com/web-repo");
        assert_eq!(url.registry(), "123456789012.dkr.ecr.eu-west-1.amazonaws.com");
    }

    #[test]
    fn repository_url_registry_without_path_is_whole_value() {
        let url = RepositoryUrl::new("localhost:5000");
        assert_eq!(url.registry(), "localhost:5000");
    }

    #[test]
    fn arn_displays_inner_value() {
        let arn = Arn::new("arn:aws:ecs:eu-west-1:123456789012:cluster/web");
        assert_eq!(
            arn.to_string(),
            "arn:aws:ecs:eu-west-1:123456789012:cluster/web"
        );
    }
}
