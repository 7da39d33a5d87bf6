// ABOUTME: Per-release outcomes of one deployment run.
// ABOUTME: The summary line starts with "OK=<n> FAILED=<m>" for scripts and CI logs.

use serde::Serialize;
use std::fmt;

use crate::types::{Namespace, ReleaseName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeStatus {
    Ok,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Ok => "OK",
            OutcomeStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseOutcome {
    pub name: ReleaseName,
    pub namespace: Namespace,
    pub status: OutcomeStatus,
    /// Install/upgrade attempts made; zero when linting failed.
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReleaseOutcome {
    pub fn ok(name: ReleaseName, namespace: Namespace, attempts: u32) -> Self {
        Self {
            name,
            namespace,
            status: OutcomeStatus::Ok,
            attempts,
            error: None,
        }
    }

    pub fn failed(
        name: ReleaseName,
        namespace: Namespace,
        attempts: u32,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name,
            namespace,
            status: OutcomeStatus::Failed,
            attempts,
            error: Some(error.into()),
        }
    }
}

/// Result of uninstalling one release during rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackOutcome {
    pub name: ReleaseName,
    pub namespace: Namespace,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Append-only record of a run, in the order outcomes were produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeployReport {
    outcomes: Vec<ReleaseOutcome>,
    rollbacks: Vec<RollbackOutcome>,
}

impl DeployReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: ReleaseOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn record_rollback(&mut self, outcome: RollbackOutcome) {
        self.rollbacks.push(outcome);
    }

    pub fn outcomes(&self) -> &[ReleaseOutcome] {
        &self.outcomes
    }

    pub fn rollbacks(&self) -> &[RollbackOutcome] {
        &self.rollbacks
    }

    pub fn ok_count(&self) -> usize {
        self.count(OutcomeStatus::Ok)
    }

    pub fn failed_count(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }

    /// Releases successfully uninstalled by rollback.
    pub fn rolled_back_count(&self) -> usize {
        self.rollbacks.iter().filter(|r| r.ok).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// `OK=<n> FAILED=<m> ROLLED_BACK=<k> [name:STATUS ...]`
    pub fn summary(&self) -> String {
        let mut text = format!(
            "OK={} FAILED={} ROLLED_BACK={}",
            self.ok_count(),
            self.failed_count(),
            self.rolled_back_count()
        );
        if !self.outcomes.is_empty() {
            let detail: Vec<String> = self
                .outcomes
                .iter()
                .map(|o| format!("{}:{}", o.name, o.status))
                .collect();
            text.push_str(&format!(" [{}]", detail.join(" ")));
        }
        text
    }
}

impl fmt::Display for DeployReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ReleaseName {
        ReleaseName::new(s).unwrap()
    }

    fn ns() -> Namespace {
        Namespace::new("ns").unwrap()
    }

    #[test]
    fn empty_report_summary() {
        let report = DeployReport::new();
        assert_eq!(report.summary(), "OK=0 FAILED=0 ROLLED_BACK=0");
        assert!(report.is_success());
    }

    #[test]
    fn summary_lists_outcomes_in_order() {
        let mut report = DeployReport::new();
        report.record(ReleaseOutcome::ok(name("a"), ns(), 1));
        report.record(ReleaseOutcome::failed(name("b"), ns(), 3, "boom"));
        report.record_rollback(RollbackOutcome {
            name: name("a"),
            namespace: ns(),
            ok: true,
            error: None,
        });

        assert_eq!(report.summary(), "OK=1 FAILED=1 ROLLED_BACK=1 [a:OK b:FAILED]");
        assert!(!report.is_success());
    }

    #[test]
    fn failed_rollbacks_are_not_counted() {
        let mut report = DeployReport::new();
        report.record_rollback(RollbackOutcome {
            name: name("a"),
            namespace: ns(),
            ok: false,
            error: Some("not found".to_string()),
        });
        assert_eq!(report.rolled_back_count(), 0);
        assert_eq!(report.rollbacks().len(), 1);
    }

    #[test]
    fn serializes_status_uppercase() {
        let outcome = ReleaseOutcome::ok(name("a"), ns(), 2);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "OK");
        assert!(json.get("error").is_none());
    }
}
