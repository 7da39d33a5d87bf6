// ABOUTME: Capability traits for the collaborators the deploy engine drives.
// ABOUTME: Exports the release client and readiness waiter plus their CLI-backed implementations.

mod helm;
mod kubectl;
pub(crate) mod process;

pub use helm::HelmCli;
pub use kubectl::KubectlWaiter;

use async_trait::async_trait;
use std::time::Duration;

use crate::config::{ReleaseSpec, RepoSpec};
use crate::types::{Namespace, ReleaseName};

/// Release management operations (a Helm equivalent).
///
/// The deploy engine only distinguishes success from failure; the error
/// detail ends up in events and the report.
#[async_trait]
pub trait ReleaseClient: Send + Sync {
    /// Register a chart repository.
    async fn add_repo(&self, repo: &RepoSpec) -> Result<(), ReleaseClientError>;

    /// Refresh every registered repository index.
    async fn update_repos(&self) -> Result<(), ReleaseClientError>;

    /// Validate a release's chart and values without installing.
    async fn lint(&self, release: &ReleaseSpec) -> Result<(), ReleaseClientError>;

    /// Install the release, or upgrade it when it already exists.
    async fn upgrade_install(&self, release: &ReleaseSpec) -> Result<(), ReleaseClientError>;

    /// Remove an installed release.
    async fn uninstall(
        &self,
        name: &ReleaseName,
        namespace: &Namespace,
    ) -> Result<(), ReleaseClientError>;

    /// Render what an upgrade would change. Preview only.
    async fn diff(&self, release: &ReleaseSpec) -> Result<String, ReleaseClientError>;
}

/// Readiness check run after a release is installed.
#[async_trait]
pub trait Waiter: Send + Sync {
    async fn wait(
        &self,
        namespace: &Namespace,
        selector: &str,
        timeout: Duration,
        context: Option<&str>,
    ) -> Result<(), WaitError>;
}

/// Errors from release client operations.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseClientError {
    #[error("{program} {command} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        program: String,
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to prepare values for {release}: {reason}")]
    Values { release: ReleaseName, reason: String },

    #[error("{0}")]
    Other(String),
}

impl ReleaseClientError {
    pub fn other(message: impl Into<String>) -> Self {
        ReleaseClientError::Other(message.into())
    }
}

/// Errors from readiness waits.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    #[error(
        "timed out after {}s waiting for '{selector}' in namespace {namespace}",
        .timeout.as_secs()
    )]
    TimedOut {
        namespace: Namespace,
        selector: String,
        timeout: Duration,
    },

    #[error("readiness check failed: {0}")]
    Failed(String),
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::TimedOut { .. })
    }
}

/// Label selector used to find a release's workload.
pub fn selector_for(key: &str, release: &ReleaseSpec) -> String {
    format!("{}={}", key, release.name)
}
