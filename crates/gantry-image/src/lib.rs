//! # gantry-image
//!
//! Container image build and publish for Gantry stacks.
//!
//! Handles:
//! - **Docker CLI**: Locating and invoking the local `docker` binary.
//! - **Auth**: Decoding ECR authorization tokens into registry credentials.
//! - **Build**: Platform-targeted image builds from a local context.
//! - **Publish**: Tagging, pushing, and resolving the pushed digest.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod auth;
pub mod docker;
pub mod publish;
