//! Stack configuration: the YAML surface and its resolved snapshot.
//!
//! The three deployment parameters keep their historical zero-value
//! fallback: a value that is absent *or zero* resolves to the default.
//! No range validation happens here — an invalid CPU/memory pairing is
//! rejected by the platform at creation time, not by gantry.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{GantryError, Result};

/// Raw stack file contents as written by the user.
///
/// Every field is optional; [`StackConfig::resolve`] fills in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackConfig {
    /// Stack name, used as the prefix of every resource name.
    #[serde(default)]
    pub name: Option<String>,
    /// AWS region override; the ambient environment is used when unset.
    #[serde(default)]
    pub region: Option<String>,
    /// Port the application container listens on.
    #[serde(default)]
    pub app_container_port: Option<u16>,
    /// Fargate task CPU units.
    #[serde(default)]
    pub cpu: Option<u32>,
    /// Container memory in MiB.
    #[serde(default)]
    pub memory: Option<u32>,
}

impl StackConfig {
    /// Loads a stack file, treating a missing file as an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| GantryError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            GantryError::config(format!("invalid stack file {}: {e}", path.display()))
        })
    }

    /// Applies defaults, treating unset or zero values as absent.
    #[must_use]
    pub fn resolve(self) -> ResolvedConfig {
        ResolvedConfig {
            name: self
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| constants::DEFAULT_STACK_NAME.to_string()),
            region: self.region.filter(|r| !r.is_empty()),
            app_container_port: or_default(
                self.app_container_port,
                constants::DEFAULT_APP_CONTAINER_PORT,
            ),
            cpu: or_default(self.cpu, constants::DEFAULT_TASK_CPU),
            memory: or_default(self.memory, constants::DEFAULT_TASK_MEMORY),
        }
    }
}

/// Configuration snapshot with every value filled in.
///
/// Read once at startup and never mutated for the duration of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Stack name prefixing every resource name.
    pub name: String,
    /// AWS region override, if any.
    pub region: Option<String>,
    /// Port the application container listens on.
    pub app_container_port: u16,
    /// Fargate task CPU units.
    pub cpu: u32,
    /// Container memory in MiB.
    pub memory: u32,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        StackConfig::default().resolve()
    }
}

/// Zero-value fallback: `None` and `0` both resolve to the default.
fn or_default<T: Copy + Default + PartialEq>(value: Option<T>, default: T) -> T {
    match value {
        Some(v) if v != T::default() => v,
        _ => default,
    }
}
