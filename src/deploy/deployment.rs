// ABOUTME: One release moving through its lifecycle, parameterized by state marker.
// ABOUTME: Transitions consume the value, so a release cannot skip lint or install.

use tokio::time::Instant;

use crate::config::ReleaseSpec;
use crate::events::{EventBus, EventKind};
use crate::types::{Namespace, ReleaseName};

use super::state::{Installed, Pending, Ready};

/// A release being deployed, parameterized by its current state.
#[derive(Debug)]
pub struct ReleaseDeployment<'a, S> {
    pub(crate) release: &'a ReleaseSpec,
    pub(crate) started: Instant,
    pub(crate) state: S,
}

impl<'a> ReleaseDeployment<'a, Pending> {
    /// Begin deploying `release`, announcing it with `ReleaseStarted`.
    pub fn start(release: &'a ReleaseSpec, bus: &EventBus) -> Self {
        tracing::info!(
            release = %release.name,
            namespace = %release.namespace,
            "deploying release"
        );
        bus.emit(EventKind::ReleaseStarted {
            name: release.name.clone(),
            namespace: release.namespace.clone(),
            chart: release.chart.clone(),
        });
        ReleaseDeployment {
            release,
            started: Instant::now(),
            state: Pending,
        }
    }
}

impl<'a, S> ReleaseDeployment<'a, S> {
    pub fn release(&self) -> &'a ReleaseSpec {
        self.release
    }

    pub fn name(&self) -> &ReleaseName {
        &self.release.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.release.namespace
    }
}

impl ReleaseDeployment<'_, Installed> {
    pub fn attempts(&self) -> u32 {
        self.state.attempts
    }
}

impl ReleaseDeployment<'_, Ready> {
    pub fn attempts(&self) -> u32 {
        self.state.attempts
    }
}
