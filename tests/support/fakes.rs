// ABOUTME: In-memory release client, release hooks, waiter and observer for deploy engine tests.
// ABOUTME: Every call is recorded so tests can assert on order and counts.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tugboat::client::{ReleaseClient, ReleaseClientError, WaitError, Waiter};
use tugboat::config::{ReleaseSpec, RepoSpec};
use tugboat::events::{Event, EventKind, Observer, ObserverError, RunContext};
use tugboat::hooks::{HookError, ReleaseHooks, ReleasePhase};
use tugboat::types::{Namespace, ReleaseName};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddRepo(String),
    UpdateRepos,
    Lint(String),
    Upgrade(String),
    Uninstall(String, String),
    Diff(String),
    /// `(hook, release, phase)`
    Hook(String, String, &'static str),
}

/// Scriptable `ReleaseClient`.
#[derive(Default)]
pub struct FakeClient {
    calls: Mutex<Vec<Call>>,
    /// Remaining upgrade failures per release; `u32::MAX` never runs out.
    upgrade_failures: Mutex<HashMap<String, u32>>,
    lint_failures: HashSet<String>,
    uninstall_failures: HashSet<String>,
    fail_add_repo: bool,
    fail_update_repos: bool,
    fail_diff: bool,
    hook_failures: HashSet<(String, ReleasePhase)>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `times` upgrades of `name`.
    pub fn fail_upgrade(self, name: &str, times: u32) -> Self {
        self.upgrade_failures.lock().insert(name.to_string(), times);
        self
    }

    pub fn always_fail_upgrade(self, name: &str) -> Self {
        self.fail_upgrade(name, u32::MAX)
    }

    pub fn fail_lint(mut self, name: &str) -> Self {
        self.lint_failures.insert(name.to_string());
        self
    }

    pub fn fail_uninstall(mut self, name: &str) -> Self {
        self.uninstall_failures.insert(name.to_string());
        self
    }

    pub fn fail_add_repo(mut self) -> Self {
        self.fail_add_repo = true;
        self
    }

    pub fn fail_update_repos(mut self) -> Self {
        self.fail_update_repos = true;
        self
    }

    pub fn fail_diff(mut self) -> Self {
        self.fail_diff = true;
        self
    }

    /// Fail `hook` whenever it runs in `phase`.
    pub fn fail_hook(mut self, hook: &str, phase: ReleasePhase) -> Self {
        self.hook_failures.insert((hook.to_string(), phase));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn upgrade_calls(&self, name: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Upgrade(n) if n == name))
            .count()
    }

    pub fn uninstalls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Uninstall(name, ns) => Some((name.clone(), ns.clone())),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ReleaseClient for FakeClient {
    async fn add_repo(&self, repo: &RepoSpec) -> Result<(), ReleaseClientError> {
        self.record(Call::AddRepo(repo.name.clone()));
        if self.fail_add_repo {
            return Err(ReleaseClientError::other(format!("cannot reach {}", repo.url)));
        }
        Ok(())
    }

    async fn update_repos(&self) -> Result<(), ReleaseClientError> {
        self.record(Call::UpdateRepos);
        if self.fail_update_repos {
            return Err(ReleaseClientError::other("index download failed"));
        }
        Ok(())
    }

    async fn lint(&self, release: &ReleaseSpec) -> Result<(), ReleaseClientError> {
        self.record(Call::Lint(release.name.to_string()));
        if self.lint_failures.contains(release.name.as_str()) {
            return Err(ReleaseClientError::other("chart metadata is missing"));
        }
        Ok(())
    }

    async fn upgrade_install(&self, release: &ReleaseSpec) -> Result<(), ReleaseClientError> {
        self.record(Call::Upgrade(release.name.to_string()));
        let mut failures = self.upgrade_failures.lock();
        if let Some(remaining) = failures.get_mut(release.name.as_str())
            && *remaining > 0
        {
            if *remaining != u32::MAX {
                *remaining -= 1;
            }
            return Err(ReleaseClientError::other("UPGRADE FAILED: timed out"));
        }
        Ok(())
    }

    async fn uninstall(
        &self,
        name: &ReleaseName,
        namespace: &Namespace,
    ) -> Result<(), ReleaseClientError> {
        self.record(Call::Uninstall(name.to_string(), namespace.to_string()));
        if self.uninstall_failures.contains(name.as_str()) {
            return Err(ReleaseClientError::other("release: not found"));
        }
        Ok(())
    }

    async fn diff(&self, release: &ReleaseSpec) -> Result<String, ReleaseClientError> {
        self.record(Call::Diff(release.name.to_string()));
        if self.fail_diff {
            return Err(ReleaseClientError::other("diff plugin not installed"));
        }
        Ok(format!("+ {}", release.name))
    }
}

/// The fake client doubles as the release hook runner so hook calls land in
/// the same call log as lint and upgrade.
#[async_trait]
impl ReleaseHooks for FakeClient {
    async fn run_release_hook(
        &self,
        hook: &str,
        phase: ReleasePhase,
        release: &ReleaseSpec,
        _run: &RunContext,
    ) -> Result<(), HookError> {
        self.record(Call::Hook(
            hook.to_string(),
            release.name.to_string(),
            phase.as_str(),
        ));
        if self.hook_failures.contains(&(hook.to_string(), phase)) {
            return Err(HookError::Failed {
                hook: hook.to_string(),
                code: Some(1),
                stderr: "seed job failed".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitBehavior {
    Ready,
    TimeOut,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitCall {
    pub namespace: String,
    pub selector: String,
    pub timeout: Duration,
    pub context: Option<String>,
}

/// `Waiter` whose result is chosen per selector; unknown selectors are ready.
#[derive(Default)]
pub struct FakeWaiter {
    behaviors: HashMap<String, WaitBehavior>,
    calls: Mutex<Vec<WaitCall>>,
}

impl FakeWaiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, behavior: WaitBehavior) -> Self {
        self.behaviors.insert(selector.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> Vec<WaitCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Waiter for FakeWaiter {
    async fn wait(
        &self,
        namespace: &Namespace,
        selector: &str,
        timeout: Duration,
        context: Option<&str>,
    ) -> Result<(), WaitError> {
        self.calls.lock().push(WaitCall {
            namespace: namespace.to_string(),
            selector: selector.to_string(),
            timeout,
            context: context.map(str::to_string),
        });

        match self.behaviors.get(selector).copied().unwrap_or(WaitBehavior::Ready) {
            WaitBehavior::Ready => Ok(()),
            WaitBehavior::TimeOut => Err(WaitError::TimedOut {
                namespace: namespace.clone(),
                selector: selector.to_string(),
                timeout,
            }),
            WaitBehavior::Fail => Err(WaitError::Failed("pod in CrashLoopBackOff".to_string())),
        }
    }
}

/// Observer keeping every event it receives.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(|e| e.kind.clone()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.kind.name()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind.name() == name)
            .count()
    }

    /// Event names concerning `release`, in order.
    pub fn names_for(&self, release: &str) -> Vec<&'static str> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind.release().is_some_and(|r| r == release))
            .map(|e| e.kind.name())
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn notify(&self, event: &Event) -> Result<(), ObserverError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}
