//! # gantry-provision
//!
//! The provisioning engine seam for Gantry stacks.
//!
//! Handles:
//! - **Provisioner**: The async trait a provisioning platform implements,
//!   one method per declared resource kind.
//! - **Deployer**: The fixed creation sequence that threads generated
//!   identifiers between declarations, and its reverse for teardown.
//! - **AWS**: The provisioner built on the official AWS SDK, covering ECS,
//!   ECR, ELBv2 and the network plumbing those resources need.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod aws;
pub mod deployer;
pub mod provisioner;
