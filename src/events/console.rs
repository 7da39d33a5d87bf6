// ABOUTME: Observer rendering deployment progress for a terminal.
// ABOUTME: Formats events through Output so quiet and JSON modes are respected.

use crate::output::{Output, OutputMode};

use super::{Event, EventKind, Observer, ObserverError};

pub struct ConsoleObserver {
    output: Output,
}

impl ConsoleObserver {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            output: Output::new(mode),
        }
    }
}

impl Observer for ConsoleObserver {
    fn notify(&self, event: &Event) -> Result<(), ObserverError> {
        if self.output.mode() == OutputMode::Json {
            self.output.json(event);
            return Ok(());
        }

        if let Some(line) = render(&event.kind) {
            self.output.progress(&line);
        }
        Ok(())
    }
}

/// Human-readable line for an event, `None` for events not worth a line.
pub(crate) fn render(kind: &EventKind) -> Option<String> {
    let line = match kind {
        EventKind::PlanComputed { order } => {
            let names: Vec<&str> = order.iter().map(|n| n.as_str()).collect();
            format!("Plan: {}", names.join(" → "))
        }
        EventKind::PlanFailed { error } => format!("  ✗ Planning failed: {error}"),
        EventKind::RepoAdded { name, url } => format!("  → Added repo {name} ({url})"),
        EventKind::ReposUpdated => "  → Repositories updated".to_string(),
        EventKind::ReleaseStarted {
            name,
            namespace,
            chart,
        } => format!("  → Deploying {name} ({chart}) into {namespace}..."),
        EventKind::ReleaseLinted { name, ok: false } => format!("  ✗ Lint failed for {name}"),
        EventKind::ReleaseLinted { .. } => return None,
        EventKind::ReleaseUpgradeAttempt { attempt: 1, .. } => return None,
        EventKind::ReleaseUpgradeAttempt { name, attempt } => {
            format!("  → Retrying {name} (attempt {attempt})...")
        }
        EventKind::ReleaseSucceeded {
            name, duration_ms, ..
        } => format!(
            "  ✓ {name} deployed ({:.1}s)",
            *duration_ms as f64 / 1000.0
        ),
        EventKind::ReleaseFailed {
            name,
            attempts,
            error,
        } => format!("  ✗ {name} failed after {attempts} attempt(s): {error}"),
        EventKind::RollbackStarted { names } if names.is_empty() => {
            "  → Nothing to roll back".to_string()
        }
        EventKind::RollbackStarted { names } => {
            let names: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
            format!("  → Rolling back {}...", names.join(", "))
        }
        EventKind::RollbackResult {
            name, ok: true, ..
        } => format!("  ✓ Uninstalled {name}"),
        EventKind::RollbackResult { name, error, .. } => format!(
            "  ✗ Failed to uninstall {name}: {}",
            error.as_deref().unwrap_or("unknown error")
        ),
        EventKind::WaiterStarted {
            name,
            selector,
            timeout_secs,
            ..
        } => format!("  → Waiting for {name} ({selector}, up to {timeout_secs}s)..."),
        EventKind::WaiterSucceeded { .. } => return None,
        EventKind::WaiterTimedOut { name, timeout_secs } => {
            format!("  ✗ {name} not ready after {timeout_secs}s")
        }
        EventKind::DeploySummary { text, .. } => format!("Summary: {text}"),
    };
    Some(line)
}
