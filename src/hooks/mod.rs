// ABOUTME: Hooks system for deployment run lifecycle events.
// ABOUTME: Runs shell scripts at pre-deploy, post-deploy and on-error, and per-release hooks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::client::process::run_command;
use crate::config::{Environment, ReleaseSpec};
use crate::events::RunContext;
use crate::types::{ReleaseName, RunId};

/// Directory, relative to the project, holding hook scripts.
pub const HOOKS_DIR: &str = ".tugboat/hooks";

/// Subdirectory of [`HOOKS_DIR`] holding the hooks releases name in `hooks:`.
pub const RELEASE_HOOKS_DIR: &str = "release";

/// Hook execution points in a deployment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before the run starts. Failure aborts the deployment.
    PreDeploy,
    /// After a run in which every release succeeded. Failure logs a warning.
    PostDeploy,
    /// After a run that failed or aborted. Failure logs a warning.
    OnError,
}

impl HookPoint {
    pub fn filename(&self) -> &'static str {
        match self {
            HookPoint::PreDeploy => "pre-deploy",
            HookPoint::PostDeploy => "post-deploy",
            HookPoint::OnError => "on-error",
        }
    }

    /// Whether failure at this hook point should abort deployment.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HookPoint::PreDeploy)
    }
}

/// Context passed to hooks via environment variables.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub environment: Environment,
    pub kube_context: Option<String>,
    pub run_id: RunId,
    pub releases: Vec<ReleaseName>,
    /// Report summary, known once the run is over.
    pub summary: Option<String>,
}

impl HookContext {
    pub fn new(run: &RunContext, releases: Vec<ReleaseName>) -> Self {
        Self {
            environment: run.environment,
            kube_context: run.kube_context.clone(),
            run_id: run.run_id.clone(),
            releases,
            summary: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn to_env(&self) -> HashMap<String, String> {
        let releases: Vec<&str> = self.releases.iter().map(ReleaseName::as_str).collect();

        let mut env = HashMap::new();
        env.insert(
            "TUGBOAT_ENVIRONMENT".to_string(),
            self.environment.to_string(),
        );
        env.insert("TUGBOAT_RUN_ID".to_string(), self.run_id.to_string());
        env.insert("TUGBOAT_RELEASES".to_string(), releases.join(","));
        if let Some(ref context) = self.kube_context {
            env.insert("TUGBOAT_CONTEXT".to_string(), context.clone());
        }
        if let Some(ref summary) = self.summary {
            env.insert("TUGBOAT_SUMMARY".to_string(), summary.clone());
        }
        env
    }
}

/// Output of a hook that ran successfully.
#[derive(Debug)]
pub struct HookResult {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("{hook} hook failed with exit code {code:?}: {stderr}")]
    Failed {
        hook: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to execute {hook} hook: {source}")]
    Spawn {
        hook: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid hook name '{0}': must be a plain file name")]
    InvalidName(String),
}

/// When a per-release hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleasePhase {
    /// After `ReleaseStarted`, before lint.
    Pre,
    /// After install and readiness, before `ReleaseSucceeded`.
    Post,
}

impl ReleasePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleasePhase::Pre => "pre",
            ReleasePhase::Post => "post",
        }
    }
}

impl fmt::Display for ReleasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the hooks a release lists in its `hooks` field.
///
/// An error fails the release.
#[async_trait]
pub trait ReleaseHooks: Send + Sync {
    async fn run_release_hook(
        &self,
        hook: &str,
        phase: ReleasePhase,
        release: &ReleaseSpec,
        run: &RunContext,
    ) -> Result<(), HookError>;
}

/// Environment for a per-release hook.
pub fn release_hook_env(
    phase: ReleasePhase,
    release: &ReleaseSpec,
    run: &RunContext,
) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("TUGBOAT_ENVIRONMENT".to_string(), run.environment.to_string());
    env.insert("TUGBOAT_RUN_ID".to_string(), run.run_id.to_string());
    env.insert("TUGBOAT_RELEASE".to_string(), release.name.to_string());
    env.insert("TUGBOAT_NAMESPACE".to_string(), release.namespace.to_string());
    env.insert("TUGBOAT_CHART".to_string(), release.chart.clone());
    env.insert("TUGBOAT_PHASE".to_string(), phase.to_string());
    if let Some(ref context) = run.kube_context {
        env.insert("TUGBOAT_CONTEXT".to_string(), context.clone());
    }
    env
}

/// Discovers and runs hooks from a project directory.
pub struct HookRunner {
    hooks_dir: PathBuf,
}

impl HookRunner {
    /// Look for hooks under `<project_dir>/.tugboat/hooks`.
    pub fn new(project_dir: &Path) -> Self {
        Self {
            hooks_dir: project_dir.join(HOOKS_DIR),
        }
    }

    pub fn hook_exists(&self, point: HookPoint) -> bool {
        self.hook_path(point).is_file()
    }

    fn hook_path(&self, point: HookPoint) -> PathBuf {
        self.hooks_dir.join(point.filename())
    }

    /// Run a hook if it exists.
    ///
    /// Returns `Ok(None)` when there is no hook for `point`.
    pub async fn run(
        &self,
        point: HookPoint,
        context: &HookContext,
    ) -> Result<Option<HookResult>, HookError> {
        let hook_path = self.hook_path(point);
        if !hook_path.is_file() {
            return Ok(None);
        }

        let hook = point.filename();
        tracing::info!("running {} hook: {}", hook, hook_path.display());

        let result = run_script(hook, &hook_path, &context.to_env()).await?;
        tracing::debug!("{} hook completed successfully", hook);
        Ok(Some(result))
    }
}

#[async_trait]
impl ReleaseHooks for HookRunner {
    /// Runs `<hooks dir>/release/<hook>`. A hook without a script is skipped.
    async fn run_release_hook(
        &self,
        hook: &str,
        phase: ReleasePhase,
        release: &ReleaseSpec,
        run: &RunContext,
    ) -> Result<(), HookError> {
        if hook.is_empty() || hook.starts_with('.') || hook.contains(['/', '\\']) {
            return Err(HookError::InvalidName(hook.to_string()));
        }

        let hook_path = self.hooks_dir.join(RELEASE_HOOKS_DIR).join(hook);
        if !hook_path.is_file() {
            tracing::debug!(release = %release.name, "no script for hook {}, skipping", hook);
            return Ok(());
        }

        tracing::info!(release = %release.name, %phase, "running release hook {}", hook);
        let env = release_hook_env(phase, release, run);
        run_script(hook, &hook_path, &env).await?;
        Ok(())
    }
}

async fn run_script(
    hook: &str,
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<HookResult, HookError> {
    let output = run_command(path, &[], env, None)
        .await
        .map_err(|source| HookError::Spawn {
            hook: hook.to_string(),
            source,
        })?;

    if !output.exited_with(&[0]) {
        return Err(HookError::Failed {
            hook: hook.to_string(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    Ok(HookResult {
        stdout: output.stdout,
        stderr: output.stderr,
    })
}
