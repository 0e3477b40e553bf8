//! Thin wrapper over the local `docker` binary.
//!
//! Builds run with piped output so progress lines reach the log stream;
//! pushes capture stdout because the pushed digest is reported there.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use gantry_common::error::{GantryError, Result};

use crate::auth::RegistryAuth;

/// Handle to a located `docker` binary.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl DockerCli {
    /// Finds `docker` on the `PATH`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no `docker` binary is installed.
    pub fn locate() -> Result<Self> {
        let binary = which::which("docker").map_err(|_| GantryError::NotFound {
            kind: "docker binary",
            id: "docker (install Docker to build stack images)".to_string(),
        })?;
        Ok(Self { binary })
    }

    /// Wraps an already-known binary path.
    #[must_use]
    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Logs in to a registry, feeding the password over stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the login process cannot be started or exits
    /// non-zero.
    pub async fn login(&self, auth: &RegistryAuth) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .args([
                "login",
                "--username",
                &auth.username,
                "--password-stdin",
                &auth.registry,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GantryError::image_build(format!("failed to start docker login: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(auth.password.as_bytes())
                .await
                .map_err(|e| {
                    GantryError::image_build(format!("failed to write docker login password: {e}"))
                })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| GantryError::image_build(format!("docker login did not finish: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GantryError::image_build(format!(
                "docker login to {} exited with {}: {}",
                auth.registry,
                output.status,
                stderr.trim()
            )));
        }

        debug!(registry = %auth.registry, "docker login succeeded");
        Ok(())
    }

    /// Builds an image from a local context for the given platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the context directory does not exist, the build
    /// process cannot be started, or the build exits non-zero.
    pub async fn build(&self, context: &Path, image: &str, platform: &str) -> Result<()> {
        if !context.is_dir() {
            return Err(GantryError::NotFound {
                kind: "build context",
                id: context.display().to_string(),
            });
        }

        let mut child = Command::new(&self.binary)
            .args(["build", "--platform", platform, "-t", image])
            .arg(context)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GantryError::image_build(format!("failed to start docker build: {e}")))?;

        let stdout_task = drain_lines(child.stdout.take());
        let stderr_task = drain_lines(child.stderr.take());

        let status = child
            .wait()
            .await
            .map_err(|e| GantryError::image_build(format!("docker build did not finish: {e}")))?;

        let (_, stderr_lines) = tokio::join!(stdout_task, stderr_task);
        let stderr_lines = stderr_lines.unwrap_or_default();

        if !status.success() {
            return Err(GantryError::image_build(format!(
                "docker build of {image} exited with {status}: {}",
                summarize_failure(&stderr_lines)
            )));
        }
        Ok(())
    }

    /// Pushes a tagged image and returns the raw push output.
    ///
    /// # Errors
    ///
    /// Returns an error if the push process cannot be started or exits
    /// non-zero.
    pub async fn push(&self, image: &str) -> Result<String> {
        let output = Command::new(&self.binary)
            .args(["push", image])
            .output()
            .await
            .map_err(|e| GantryError::image_build(format!("failed to start docker push: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GantryError::image_build(format!(
                "docker push of {image} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extracts the `sha256:...` content digest from `docker push` output.
///
/// The push summary line reads `TAG: digest: sha256:HEX size: N` and is
/// printed last, so the scan runs from the end.
#[must_use]
pub fn parse_push_digest(push_output: &str) -> Option<String> {
    push_output.lines().rev().find_map(|line| {
        let (_, rest) = line.split_once("digest: ")?;
        let digest = rest.split_whitespace().next()?;
        digest.starts_with("sha256:").then(|| digest.to_string())
    })
}

fn drain_lines<R>(reader: Option<R>) -> tokio::task::JoinHandle<Vec<String>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut collected = Vec::new();
        if let Some(reader) = reader {
            let mut lines = BufReader::new(reader).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "gantry::docker", "{line}");
                collected.push(line);
            }
        }
        collected
    })
}

/// Last few output lines, where docker prints the actual failure.
fn summarize_failure(lines: &[String]) -> String {
    const KEEP: usize = 3;
    let start = lines.len().saturating_sub(KEEP);
    let tail = &lines[start..];
    if tail.is_empty() {
        "no output captured".to_string()
    } else {
        tail.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_digest_from_push_summary() {
        let output = "\
The push refers to repository [123456789012.dkr.ecr.us-east-1.amazonaws.com/web-repo]\n\
5f70bf18a086: Pushed\n\
20260825T120000: digest: sha256:2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae size: 1573\n";
        assert_eq!(
            parse_push_digest(output).expect("digest line should parse"),
            "sha256:2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae"
        );
    }

    #[test]
    fn push_output_without_digest_yields_none() {
        assert_eq!(parse_push_digest("5f70bf18a086: Pushed\n"), None);
    }

    #[test]
    fn failure_summary_keeps_the_tail() {
        let lines: Vec<String> = (1..=5).map(|n| format!("line {n}")).collect();
        assert_eq!(summarize_failure(&lines), "line 3; line 4; line 5");
        assert_eq!(summarize_failure(&[]), "no output captured");
    }

    #[tokio::test]
    async fn build_rejects_missing_context() {
        let cli = DockerCli::with_binary(PathBuf::from("docker"));
        let err = cli
            .build(Path::new("/nonexistent/app"), "img:tag", "linux/arm64")
            .await
            .expect_err("missing context should fail before spawning");
        assert!(matches!(
            err,
            GantryError::NotFound {
                kind: "build context",
                ..
            }
        ));
    }
}
