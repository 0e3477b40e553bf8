//! Unified error types for the gantry workspace.
//!
//! Provisioning failures carry the declared resource they belong to; AWS and
//! toolchain errors are display-formatted into the message rather than
//! interpreted, so whatever the platform reports surfaces unmodified.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum GantryError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A stack file or configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A provisioning call for a declared resource failed.
    #[error("provisioning {resource} failed: {message}")]
    Provision {
        /// Name of the declared resource whose creation or deletion failed.
        resource: String,
        /// Report from the provisioning platform, unmodified.
        message: String,
    },

    /// Building or publishing the container image failed.
    #[error("image build failed: {message}")]
    ImageBuild {
        /// Description of the failed build step.
        message: String,
    },
}

impl GantryError {
    /// Wraps a platform failure for the named declared resource.
    #[must_use]
    pub fn provision(resource: impl Into<String>, source: impl fmt::Display) -> Self {
        Self::Provision {
            resource: resource.into(),
            message: source.to_string(),
        }
    }

    /// Wraps a failed container image build step.
    #[must_use]
    pub fn image_build(message: impl Into<String>) -> Self {
        Self::ImageBuild {
            message: message.into(),
        }
    }

    /// Builds a configuration error from a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, GantryError>;
