//! # gantry-topology
//!
//! Declarative model of the deployment topology.
//!
//! Handles:
//! - **Resources**: The five resource declarations (cluster, load balancer,
//!   repository, image, service) and their fixed attributes.
//! - **Outputs**: The identifier handles each declaration yields once
//!   provisioned, and the stack's exported values.
//! - **Topology**: Assembly of the declarations from a resolved stack
//!   configuration, and the rendered creation plan.
//!
//! The creation order is a constant linear sequence with generated
//! identifiers threaded directly between declarations; dependency resolution
//! and execution belong to the provisioning layer, not to this crate.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod outputs;
pub mod resources;
pub mod topology;
