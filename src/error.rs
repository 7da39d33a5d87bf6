// ABOUTME: Application-wide error types for tugboat.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::client::ReleaseClientError;
use crate::deploy::{DeployError, DeployErrorKind};
use crate::events::ObserverError;
use crate::hooks::HookError;
use crate::plan::PlanError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Client(#[from] ReleaseClientError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("cannot open event log: {0}")]
    Observer(#[from] ObserverError),

    /// The run finished but at least one release failed.
    #[error("deployment failed: {summary}")]
    DeployFailed { summary: String },
}

impl Error {
    /// Kind of the run-fatal deploy error, if this is one.
    pub fn deploy_kind(&self) -> Option<DeployErrorKind> {
        match self {
            Error::Deploy(e) => Some(e.kind()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
