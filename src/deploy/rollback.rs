// ABOUTME: Best-effort rollback of releases installed earlier in a failed run.
// ABOUTME: Uninstalls most-recent-first and keeps going when one uninstall fails.

use crate::client::ReleaseClient;
use crate::config::ReleaseSpec;
use crate::events::{EventBus, EventKind};

use super::report::{DeployReport, RollbackOutcome};

/// Uninstall `deployed` in reverse order, recording each result in `report`.
///
/// `RollbackStarted` is emitted even when there is nothing to uninstall.
pub async fn rollback(
    client: &dyn ReleaseClient,
    bus: &EventBus,
    deployed: &[&ReleaseSpec],
    report: &mut DeployReport,
) {
    bus.emit(EventKind::RollbackStarted {
        names: deployed.iter().rev().map(|r| r.name.clone()).collect(),
    });

    for release in deployed.iter().rev() {
        let result = client.uninstall(&release.name, &release.namespace).await;
        let error = match result {
            Ok(()) => {
                tracing::info!(release = %release.name, "rolled back");
                None
            }
            Err(e) => {
                tracing::warn!(release = %release.name, "rollback failed: {}", e);
                Some(e.to_string())
            }
        };

        bus.emit(EventKind::RollbackResult {
            name: release.name.clone(),
            ok: error.is_none(),
            error: error.clone(),
        });
        report.record_rollback(RollbackOutcome {
            name: release.name.clone(),
            namespace: release.namespace.clone(),
            ok: error.is_none(),
            error,
        });
    }
}
