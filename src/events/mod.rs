// ABOUTME: Lifecycle events emitted while planning and deploying releases.
// ABOUTME: Events are delivered to observers through the EventBus.

mod bus;
mod console;
mod observer;

pub use bus::EventBus;
pub use console::ConsoleObserver;
pub use observer::{JsonFileObserver, LogObserver, Observer, ObserverError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ClusterConfig, Environment};
use crate::types::{Namespace, ReleaseName, RunId};

/// Identity shared by every event of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunContext {
    pub run_id: RunId,
    pub environment: Environment,
    pub kube_context: Option<String>,
}

impl RunContext {
    pub fn new(environment: Environment, kube_context: Option<String>) -> Self {
        Self {
            run_id: RunId::generate(),
            environment,
            kube_context,
        }
    }

    pub fn for_config(config: &ClusterConfig) -> Self {
        Self::new(config.environment, config.context.clone())
    }
}

/// An event together with the run it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub ts: DateTime<Utc>,
    pub run_id: RunId,
    pub environment: Environment,
    pub kube_context: Option<String>,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum EventKind {
    PlanComputed {
        order: Vec<ReleaseName>,
    },
    PlanFailed {
        error: String,
    },
    RepoAdded {
        name: String,
        url: String,
    },
    ReposUpdated,
    ReleaseStarted {
        name: ReleaseName,
        namespace: Namespace,
        chart: String,
    },
    ReleaseLinted {
        name: ReleaseName,
        ok: bool,
    },
    ReleaseUpgradeAttempt {
        name: ReleaseName,
        attempt: u32,
    },
    ReleaseSucceeded {
        name: ReleaseName,
        attempts: u32,
        duration_ms: u64,
    },
    ReleaseFailed {
        name: ReleaseName,
        attempts: u32,
        error: String,
    },
    RollbackStarted {
        names: Vec<ReleaseName>,
    },
    RollbackResult {
        name: ReleaseName,
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    WaiterStarted {
        name: ReleaseName,
        namespace: Namespace,
        selector: String,
        timeout_secs: u64,
    },
    WaiterSucceeded {
        name: ReleaseName,
    },
    WaiterTimedOut {
        name: ReleaseName,
        timeout_secs: u64,
    },
    DeploySummary {
        ok_count: usize,
        failed_count: usize,
        text: String,
    },
}

impl EventKind {
    /// Stable variant name, used for logs and JSON `type` tags.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::PlanComputed { .. } => "PlanComputed",
            EventKind::PlanFailed { .. } => "PlanFailed",
            EventKind::RepoAdded { .. } => "RepoAdded",
            EventKind::ReposUpdated => "ReposUpdated",
            EventKind::ReleaseStarted { .. } => "ReleaseStarted",
            EventKind::ReleaseLinted { .. } => "ReleaseLinted",
            EventKind::ReleaseUpgradeAttempt { .. } => "ReleaseUpgradeAttempt",
            EventKind::ReleaseSucceeded { .. } => "ReleaseSucceeded",
            EventKind::ReleaseFailed { .. } => "ReleaseFailed",
            EventKind::RollbackStarted { .. } => "RollbackStarted",
            EventKind::RollbackResult { .. } => "RollbackResult",
            EventKind::WaiterStarted { .. } => "WaiterStarted",
            EventKind::WaiterSucceeded { .. } => "WaiterSucceeded",
            EventKind::WaiterTimedOut { .. } => "WaiterTimedOut",
            EventKind::DeploySummary { .. } => "DeploySummary",
        }
    }

    /// Release the event is about, if it concerns a single release.
    pub fn release(&self) -> Option<&ReleaseName> {
        match self {
            EventKind::ReleaseStarted { name, .. }
            | EventKind::ReleaseLinted { name, .. }
            | EventKind::ReleaseUpgradeAttempt { name, .. }
            | EventKind::ReleaseSucceeded { name, .. }
            | EventKind::ReleaseFailed { name, .. }
            | EventKind::RollbackResult { name, .. }
            | EventKind::WaiterStarted { name, .. }
            | EventKind::WaiterSucceeded { name }
            | EventKind::WaiterTimedOut { name, .. } => Some(name),
            EventKind::PlanComputed { .. }
            | EventKind::PlanFailed { .. }
            | EventKind::RepoAdded { .. }
            | EventKind::ReposUpdated
            | EventKind::RollbackStarted { .. }
            | EventKind::DeploySummary { .. } => None,
        }
    }
}
