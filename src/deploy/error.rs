// ABOUTME: Run-fatal deployment errors with SNAFU pattern.
// ABOUTME: Release failures are not errors; they are recorded in the report.

use snafu::Snafu;

use crate::client::{ReleaseClientError, WaitError};
use crate::plan::PlanError;
use crate::types::ReleaseName;

/// Failures that abort a run instead of being captured in the report.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DeployError {
    #[snafu(context(false), display("planning failed: {source}"))]
    Plan { source: PlanError },

    #[snafu(display("repository sync failed: {source}"))]
    RepoSync { source: ReleaseClientError },

    #[snafu(display("release {release} did not become ready: {source}"))]
    WaiterTimeout {
        release: ReleaseName,
        source: WaitError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// A dependency references a release that does not exist.
    UnknownDependency,
    /// The dependency graph contains a cycle.
    CyclicDependency,
    /// Two releases share a name.
    DuplicateRelease,
    /// Adding or updating chart repositories failed.
    RepoSync,
    /// A readiness wait timed out.
    WaiterTimeout,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::Plan { source } => match source {
                PlanError::UnknownDependency { .. } => DeployErrorKind::UnknownDependency,
                PlanError::CyclicDependency { .. } => DeployErrorKind::CyclicDependency,
                PlanError::DuplicateRelease(_) => DeployErrorKind::DuplicateRelease,
            },
            DeployError::RepoSync { .. } => DeployErrorKind::RepoSync,
            DeployError::WaiterTimeout { .. } => DeployErrorKind::WaiterTimeout,
        }
    }

    /// Release whose readiness wait timed out.
    pub fn timed_out_release(&self) -> Option<&ReleaseName> {
        match self {
            DeployError::WaiterTimeout { release, .. } => Some(release),
            _ => None,
        }
    }
}
