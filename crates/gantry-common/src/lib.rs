//! # gantry-common
//!
//! Shared error definitions, domain primitives, constants, and the stack
//! configuration model used across the entire gantry workspace.
//!
//! This crate is the leaf of the dependency graph — it depends on no other
//! internal crate and provides the foundational types that all other crates
//! build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
