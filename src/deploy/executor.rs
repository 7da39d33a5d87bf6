// ABOUTME: Deploy engine driving every release of a config through its lifecycle.
// ABOUTME: Plans, syncs repos, deploys in plan order and rolls back on the first failure.

use snafu::ResultExt;
use std::sync::Arc;

use crate::client::{ReleaseClient, Waiter};
use crate::config::{ClusterConfig, ReleaseSpec};
use crate::events::{EventBus, EventKind, Observer, RunContext};
use crate::hooks::{ReleaseHooks, ReleasePhase};
use crate::plan::{Plan, compute_plan};

use super::deployment::ReleaseDeployment;
use super::error::{DeployError, RepoSyncSnafu};
use super::options::DeployOptions;
use super::report::{DeployReport, ReleaseOutcome};
use super::rollback::rollback;
use super::transitions::TransitionError;

/// Deploy every release in `config`, reporting to `observers`.
///
/// Release failures are captured in the returned report. Planning errors,
/// repo sync failures and waiter timeouts abort the run with an error.
pub async fn deploy_all(
    config: &ClusterConfig,
    client: &dyn ReleaseClient,
    waiter: Option<&dyn Waiter>,
    observers: Vec<Arc<dyn Observer>>,
    options: &DeployOptions,
) -> Result<DeployReport, DeployError> {
    let bus = EventBus::new(observers, RunContext::for_config(config));
    Deployer::new(config, client, &bus, options)
        .waiter(waiter)
        .run()
        .await
}

/// One deployment run over a shared event bus.
pub struct Deployer<'a> {
    config: &'a ClusterConfig,
    client: &'a dyn ReleaseClient,
    waiter: Option<&'a dyn Waiter>,
    hooks: Option<&'a dyn ReleaseHooks>,
    bus: &'a EventBus,
    options: &'a DeployOptions,
}

impl<'a> Deployer<'a> {
    pub fn new(
        config: &'a ClusterConfig,
        client: &'a dyn ReleaseClient,
        bus: &'a EventBus,
        options: &'a DeployOptions,
    ) -> Self {
        Self {
            config,
            client,
            waiter: None,
            hooks: None,
            bus,
            options,
        }
    }

    pub fn waiter(mut self, waiter: Option<&'a dyn Waiter>) -> Self {
        self.waiter = waiter;
        self
    }

    /// Run the releases' `hooks` before lint and after readiness.
    pub fn hooks(mut self, hooks: Option<&'a dyn ReleaseHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub async fn run(&self) -> Result<DeployReport, DeployError> {
        let plan = compute_plan(self.config, self.bus)?;
        self.execute(plan).await
    }

    /// Deploy an already computed plan of this deployer's config.
    ///
    /// Callers that need the order before anything runs compute the plan
    /// themselves; `PlanComputed` is then emitted only once.
    pub async fn execute(&self, plan: Plan<'a>) -> Result<DeployReport, DeployError> {
        self.sync_repos().await?;

        let mut report = DeployReport::new();
        let mut deployed: Vec<&ReleaseSpec> = Vec::with_capacity(plan.len());

        for release in plan.iter() {
            match self.deploy_release(release).await {
                Ok(outcome) => {
                    report.record(outcome);
                    deployed.push(release);
                }
                Err(TransitionError::Aborted(e)) => {
                    tracing::error!(release = %release.name, "aborting run: {}", e);
                    return Err(e);
                }
                Err(TransitionError::Failed(failure)) => {
                    self.bus.emit(EventKind::ReleaseFailed {
                        name: release.name.clone(),
                        attempts: failure.attempts,
                        error: failure.error.clone(),
                    });
                    report.record(ReleaseOutcome::failed(
                        release.name.clone(),
                        release.namespace.clone(),
                        failure.attempts,
                        failure.error,
                    ));
                    rollback(self.client, self.bus, &deployed, &mut report).await;
                    break;
                }
            }
        }

        let text = report.summary();
        tracing::info!("{}", text);
        self.bus.emit(EventKind::DeploySummary {
            ok_count: report.ok_count(),
            failed_count: report.failed_count(),
            text,
        });
        Ok(report)
    }

    async fn sync_repos(&self) -> Result<(), DeployError> {
        for repo in &self.config.repos {
            self.client.add_repo(repo).await.context(RepoSyncSnafu)?;
            self.bus.emit(EventKind::RepoAdded {
                name: repo.name.clone(),
                url: repo.url.clone(),
            });
        }
        self.client.update_repos().await.context(RepoSyncSnafu)?;
        self.bus.emit(EventKind::ReposUpdated);
        Ok(())
    }

    async fn deploy_release(
        &self,
        release: &'a ReleaseSpec,
    ) -> Result<ReleaseOutcome, TransitionError> {
        let pending = ReleaseDeployment::start(release, self.bus);
        if let Some(hooks) = self.hooks {
            pending
                .run_hooks(hooks, ReleasePhase::Pre, self.bus, 0)
                .await?;
        }

        let linted = pending.lint(self.client, self.bus).await?;

        if self.options.debug {
            linted.preview(self.client).await;
        }

        let installed = linted.install(self.client, self.bus, self.options).await?;

        let ready = match self.waiter {
            Some(waiter) if self.options.use_waiter => {
                installed.wait(waiter, self.bus, self.options).await?
            }
            _ => installed.skip_wait(),
        };

        if let Some(hooks) = self.hooks {
            ready
                .run_hooks(hooks, ReleasePhase::Post, self.bus, ready.attempts())
                .await?;
        }

        Ok(ready.succeed(self.bus))
    }
}
