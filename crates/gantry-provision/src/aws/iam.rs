//! Task execution role management.

use aws_sdk_iam::error::DisplayErrorContext;
use aws_sdk_iam::Client;
use tracing::debug;

use gantry_common::error::{GantryError, Result};

/// Managed policy granting image pulls and log writes to the agent.
const EXECUTION_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy";

/// Returns the ARN of the task execution role, creating it on first use.
///
/// The role lets the container agent pull the image from the repository.
/// Roles are account-global, so an existing role with the expected name is
/// reused as-is.
pub(crate) async fn ensure_execution_role(iam: &Client, role_name: &str) -> Result<String> {
    match iam.get_role().role_name(role_name).send().await {
        Ok(output) => {
            let role = output.role().ok_or_else(|| {
                GantryError::provision(role_name, "role lookup response carried no role")
            })?;
            debug!(role = role_name, "reusing task execution role");
            return Ok(role.arn().to_string());
        }
        Err(err) => {
            let err = err.into_service_error();
            if !err.is_no_such_entity_exception() {
                return Err(GantryError::provision(role_name, DisplayErrorContext(err)));
            }
        }
    }

    let created = iam
        .create_role()
        .role_name(role_name)
        .assume_role_policy_document(assume_role_document())
        .send()
        .await
        .map_err(|e| GantryError::provision(role_name, DisplayErrorContext(e)))?;

    let arn = created
        .role()
        .map(|role| role.arn().to_string())
        .ok_or_else(|| GantryError::provision(role_name, "role creation response carried no role"))?;

    let _ = iam
        .attach_role_policy()
        .role_name(role_name)
        .policy_arn(EXECUTION_POLICY_ARN)
        .send()
        .await
        .map_err(|e| GantryError::provision(role_name, DisplayErrorContext(e)))?;

    debug!(role = role_name, arn = %arn, "task execution role created");
    Ok(arn)
}

/// Trust policy letting ECS tasks assume the role.
fn assume_role_document() -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "ecs-tasks.amazonaws.com" },
            "Action": "sts:AssumeRole",
        }]
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_policy_targets_ecs_tasks() {
        let doc: serde_json::Value =
            serde_json::from_str(&assume_role_document()).expect("document should be valid JSON");
        assert_eq!(doc["Version"], "2012-10-17");
        assert_eq!(
            doc["Statement"][0]["Principal"]["Service"],
            "ecs-tasks.amazonaws.com"
        );
        assert_eq!(doc["Statement"][0]["Action"], "sts:AssumeRole");
    }
}
