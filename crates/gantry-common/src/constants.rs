//! Workspace-wide defaults and fixed topology attributes.

/// Default application container port when the stack file leaves it unset.
pub const DEFAULT_APP_CONTAINER_PORT: u16 = 8080;

/// Default Fargate task CPU units.
pub const DEFAULT_TASK_CPU: u32 = 512;

/// Default container memory in MiB.
pub const DEFAULT_TASK_MEMORY: u32 = 128;

/// Name of the single application container in the task definition.
pub const CONTAINER_NAME: &str = "app";

/// Build context directory for the application image, relative to the
/// directory gantry runs in.
pub const BUILD_CONTEXT: &str = "./app";

/// Platform the application image is built for.
///
/// Linux tasks with the ARM64 architecture don't support the Fargate Spot
/// capacity provider, and a few zones don't offer ARM at all; the service's
/// runtime platform must match this value.
pub const IMAGE_PLATFORM: &str = "linux/arm64";

/// Operating system family of the Fargate runtime platform.
pub const OS_FAMILY: &str = "LINUX";

/// CPU architecture of the Fargate runtime platform.
pub const CPU_ARCHITECTURE: &str = "ARM64";

/// Port of the public HTTP listener. The exported URL carries no port, so
/// this stays at the HTTP default regardless of the container port.
pub const LISTENER_PORT: u16 = 80;

/// Number of service tasks kept running.
pub const DESIRED_COUNT: i32 = 1;

/// Default stack file name, looked up in the working directory.
pub const DEFAULT_STACK_FILE: &str = "gantry.yaml";

/// Stack name used when the stack file leaves it unset; every resource name
/// is prefixed with the stack name.
pub const DEFAULT_STACK_NAME: &str = "fargate-app";

/// Application name used in CLI output.
pub const APP_NAME: &str = "gantry";
