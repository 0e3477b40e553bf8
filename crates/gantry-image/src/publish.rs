//! Build-and-push pipeline producing a pushed image reference.

use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use gantry_common::error::Result;
use gantry_common::types::{ImageUri, RepositoryUrl};

use crate::auth::RegistryAuth;
use crate::docker::{parse_push_digest, DockerCli};

/// Builds a local context and pushes the result to a registry repository.
#[derive(Debug, Clone)]
pub struct ImagePublisher {
    docker: DockerCli,
}

impl ImagePublisher {
    /// Creates a publisher over a located docker binary.
    #[must_use]
    pub fn new(docker: DockerCli) -> Self {
        Self { docker }
    }

    /// Builds `context` for `platform`, pushes it to `repository`, and
    /// returns the reference the pushed image is reachable under.
    ///
    /// The push tag is a fresh UTC timestamp so repeated deploys of the same
    /// context still register distinct task definitions. The returned
    /// reference is pinned to the pushed digest when the push output reports
    /// one, and falls back to the timestamp tag otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if login, build, or push fails.
    pub async fn publish(
        &self,
        context: &Path,
        platform: &str,
        repository: &RepositoryUrl,
        auth: &RegistryAuth,
    ) -> Result<ImageUri> {
        let tagged = format!("{repository}:{tag}", tag = build_tag());

        self.docker.login(auth).await?;

        info!(image = %tagged, platform, context = %context.display(), "building container image");
        self.docker.build(context, &tagged, platform).await?;

        info!(image = %tagged, "pushing container image");
        let push_output = self.docker.push(&tagged).await?;

        Ok(pinned_reference(repository, &tagged, &push_output))
    }
}

/// Timestamp tag for this push, `YYYYMMDDTHHMMSSZ`.
fn build_tag() -> String {
    Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

/// Digest-pinned reference when the push reported one, tag reference
/// otherwise.
fn pinned_reference(repository: &RepositoryUrl, tagged: &str, push_output: &str) -> ImageUri {
    match parse_push_digest(push_output) {
        Some(digest) => ImageUri::new(format!("{repository}@{digest}")),
        None => {
            warn!(image = %tagged, "push output carried no digest, using the tag reference");
            ImageUri::new(tagged)
        }
    }
}
