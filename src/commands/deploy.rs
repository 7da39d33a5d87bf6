// ABOUTME: Deploy command implementation.
// ABOUTME: Wires observers, hooks and the helm/kubectl collaborators around the deploy engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tugboat::client::{HelmCli, KubectlWaiter};
use tugboat::config::ClusterConfig;
use tugboat::deploy::{DeployOptions, DeployReport, Deployer};
use tugboat::diagnostics::{Diagnostics, Warning};
use tugboat::error::{Error, Result};
use tugboat::events::{
    ConsoleObserver, EventBus, JsonFileObserver, LogObserver, Observer, RunContext,
};
use tugboat::hooks::{HookContext, HookPoint, HookRunner};
use tugboat::output::Output;
use tugboat::plan::compute_plan;

/// Flags that override the config's deploy section.
#[derive(Debug, Default)]
pub struct DeployArgs {
    pub retries: Option<u32>,
    pub backoff: Option<Duration>,
    pub wait: bool,
    pub debug: bool,
    pub events: Option<PathBuf>,
}

impl DeployArgs {
    fn options(&self, config: &ClusterConfig) -> DeployOptions {
        let mut options = DeployOptions::from_config(config);
        if let Some(retries) = self.retries {
            options = options.retries(retries);
        }
        if let Some(backoff) = self.backoff {
            options = options.backoff(backoff);
        }
        if self.wait {
            options = options.use_waiter(true);
        }
        if self.debug {
            options = options.debug(true);
        }
        options
    }
}

/// Deploy every release of `config`.
pub async fn deploy(
    config: ClusterConfig,
    project_dir: &Path,
    args: DeployArgs,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let options = args.options(&config);
    let hook_runner = HookRunner::new(project_dir);
    let mut diag = Diagnostics::default();

    let mut observers: Vec<Arc<dyn Observer>> = vec![
        Arc::new(LogObserver),
        Arc::new(ConsoleObserver::new(output.mode())),
    ];
    if let Some(ref path) = args.events {
        observers.push(Arc::new(JsonFileObserver::create(path)?));
    }
    let bus = EventBus::new(observers, RunContext::for_config(&config));

    // An invalid config must fail before the pre-deploy hook can touch anything.
    let plan = compute_plan(&config, &bus)?;
    let hook_context = HookContext::new(bus.context(), plan.names());

    output.progress(&format!(
        "Deploying {} release(s) to {} (run {})",
        config.releases.len(),
        config.environment,
        bus.context().run_id
    ));

    hook_runner.run(HookPoint::PreDeploy, &hook_context).await?;

    let helm = HelmCli::from_config(&config);
    let waiter = KubectlWaiter::from_config(&config);
    let result = Deployer::new(&config, &helm, &bus, &options)
        .waiter(Some(&waiter))
        .hooks(Some(&hook_runner))
        .execute(plan)
        .await;

    let outcome = match result {
        Ok(report) if report.is_success() => {
            let context = hook_context.with_summary(report.summary());
            run_warning_hook(&hook_runner, HookPoint::PostDeploy, &context, &mut diag).await;
            Ok(report)
        }
        Ok(report) => {
            diag.collect_rollbacks(&report);
            let context = hook_context.with_summary(report.summary());
            run_warning_hook(&hook_runner, HookPoint::OnError, &context, &mut diag).await;
            Err(Error::DeployFailed {
                summary: report.summary(),
            })
        }
        Err(e) => {
            run_warning_hook(&hook_runner, HookPoint::OnError, &hook_context, &mut diag).await;
            Err(Error::Deploy(e))
        }
    };

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    outcome.map(|report: DeployReport| output.success(&report.summary()))
}

/// Run a hook whose failure only warrants a warning.
async fn run_warning_hook(
    runner: &HookRunner,
    point: HookPoint,
    context: &HookContext,
    diag: &mut Diagnostics,
) {
    if let Err(e) = runner.run(point, context).await {
        diag.warn(Warning::hook(e.to_string()));
    }
}
