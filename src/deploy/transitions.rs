// ABOUTME: State transition methods for a single release.
// ABOUTME: Each method consumes self and returns the next state or why the release stopped.

use snafu::IntoError;

use crate::client::{ReleaseClient, WaitError, Waiter, selector_for};
use crate::events::{EventBus, EventKind};
use crate::hooks::{ReleaseHooks, ReleasePhase};

use super::deployment::ReleaseDeployment;
use super::error::{DeployError, WaiterTimeoutSnafu};
use super::options::DeployOptions;
use super::report::ReleaseOutcome;
use super::state::{Installed, Linted, Pending, Ready};

/// Why a release did not reach `Ready`.
#[derive(Debug)]
pub enum TransitionError {
    /// The release failed; prior successes are rolled back and the run
    /// finishes with a report.
    Failed(ReleaseFailure),
    /// The whole run stops here, without rollback.
    Aborted(DeployError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
    pub attempts: u32,
    pub error: String,
}

fn failed(attempts: u32, error: impl ToString) -> TransitionError {
    TransitionError::Failed(ReleaseFailure {
        attempts,
        error: error.to_string(),
    })
}

/// Result type for release transitions.
pub type TransitionResult<'a, T> = Result<ReleaseDeployment<'a, T>, TransitionError>;

impl<'a, S> ReleaseDeployment<'a, S> {
    fn transition<T>(self, state: T) -> ReleaseDeployment<'a, T> {
        ReleaseDeployment {
            release: self.release,
            started: self.started,
            state,
        }
    }
}

impl<S> ReleaseDeployment<'_, S> {
    /// Run the release's `phase` hooks in listed order. The first failing
    /// hook fails the release with `attempts` recorded.
    pub async fn run_hooks(
        &self,
        hooks: &dyn ReleaseHooks,
        phase: ReleasePhase,
        bus: &EventBus,
        attempts: u32,
    ) -> Result<(), TransitionError> {
        for hook in &self.release.hooks {
            if let Err(e) = hooks
                .run_release_hook(hook, phase, self.release, bus.context())
                .await
            {
                tracing::warn!(
                    release = %self.release.name,
                    %phase,
                    "hook {} failed: {}",
                    hook,
                    e
                );
                return Err(failed(attempts, e));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Pending -> Linted
// =============================================================================

impl<'a> ReleaseDeployment<'a, Pending> {
    /// Lint the chart once. A lint failure fails the release without
    /// consuming an install attempt.
    pub async fn lint(
        self,
        client: &dyn ReleaseClient,
        bus: &EventBus,
    ) -> TransitionResult<'a, Linted> {
        let result = client.lint(self.release).await;
        bus.emit(EventKind::ReleaseLinted {
            name: self.release.name.clone(),
            ok: result.is_ok(),
        });

        match result {
            Ok(()) => Ok(self.transition(Linted)),
            Err(e) => {
                tracing::warn!(release = %self.release.name, "lint failed: {}", e);
                Err(failed(0, e))
            }
        }
    }
}

// =============================================================================
// Linted -> Installed
// =============================================================================

impl<'a> ReleaseDeployment<'a, Linted> {
    /// Log what an upgrade would change. Errors are reported and ignored.
    pub async fn preview(&self, client: &dyn ReleaseClient) {
        match client.diff(self.release).await {
            Ok(diff) if diff.trim().is_empty() => {
                tracing::info!(release = %self.release.name, "no changes");
            }
            Ok(diff) => {
                tracing::info!(release = %self.release.name, "diff:\n{}", diff.trim_end());
            }
            Err(e) => {
                tracing::warn!(release = %self.release.name, "diff failed: {}", e);
            }
        }
    }

    /// `upgrade --install` with up to `options.retries` attempts and a
    /// fixed `options.backoff` between them.
    pub async fn install(
        self,
        client: &dyn ReleaseClient,
        bus: &EventBus,
        options: &DeployOptions,
    ) -> TransitionResult<'a, Installed> {
        let max_attempts = options.max_attempts();
        let mut attempt = 1;

        loop {
            bus.emit(EventKind::ReleaseUpgradeAttempt {
                name: self.release.name.clone(),
                attempt,
            });

            match client.upgrade_install(self.release).await {
                Ok(()) => {
                    return Ok(self.transition(Installed { attempts: attempt }));
                }
                Err(e) if attempt < max_attempts => {
                    tracing::warn!(
                        release = %self.release.name,
                        attempt,
                        max_attempts,
                        "upgrade failed, retrying in {:?}: {}",
                        options.backoff,
                        e
                    );
                    tokio::time::sleep(options.backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(release = %self.release.name, attempt, "upgrade failed: {}", e);
                    return Err(failed(attempt, e));
                }
            }
        }
    }
}

// =============================================================================
// Installed -> Ready
// =============================================================================

impl<'a> ReleaseDeployment<'a, Installed> {
    /// Block until the release's pods report ready.
    ///
    /// A timeout aborts the run. Any other waiter error fails the release.
    pub async fn wait(
        self,
        waiter: &dyn Waiter,
        bus: &EventBus,
        options: &DeployOptions,
    ) -> TransitionResult<'a, Ready> {
        let release = self.release;
        let selector = selector_for(&options.selector_key, release);
        let timeout_secs = release.timeout.as_secs();

        bus.emit(EventKind::WaiterStarted {
            name: release.name.clone(),
            namespace: release.namespace.clone(),
            selector: selector.clone(),
            timeout_secs,
        });

        let context = bus.context().kube_context.as_deref();
        match waiter
            .wait(&release.namespace, &selector, release.timeout, context)
            .await
        {
            Ok(()) => {
                bus.emit(EventKind::WaiterSucceeded {
                    name: release.name.clone(),
                });
                let attempts = self.state.attempts;
                Ok(self.transition(Ready { attempts }))
            }
            Err(source @ WaitError::TimedOut { .. }) => {
                bus.emit(EventKind::WaiterTimedOut {
                    name: release.name.clone(),
                    timeout_secs,
                });
                let error = WaiterTimeoutSnafu {
                    release: release.name.clone(),
                }
                .into_error(source);
                Err(TransitionError::Aborted(error))
            }
            Err(e) => Err(failed(self.state.attempts, e)),
        }
    }

    pub fn skip_wait(self) -> ReleaseDeployment<'a, Ready> {
        let attempts = self.state.attempts;
        self.transition(Ready { attempts })
    }
}

// =============================================================================
// Ready -> done
// =============================================================================

impl ReleaseDeployment<'_, Ready> {
    /// Announce success and produce the release's outcome.
    pub fn succeed(self, bus: &EventBus) -> ReleaseOutcome {
        let duration_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            release = %self.release.name,
            attempts = self.state.attempts,
            duration_ms,
            "release deployed"
        );
        bus.emit(EventKind::ReleaseSucceeded {
            name: self.release.name.clone(),
            attempts: self.state.attempts,
            duration_ms,
        });
        ReleaseOutcome::ok(
            self.release.name.clone(),
            self.release.namespace.clone(),
            self.state.attempts,
        )
    }
}
