// ABOUTME: Diagnostics accumulator for non-fatal warnings during a deployment run.
// ABOUTME: Collects warnings that shouldn't fail a run but should be shown to users.

use crate::deploy::DeployReport;

/// Collects non-fatal warnings during deployment operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Record every rollback that could not uninstall its release.
    pub fn collect_rollbacks(&mut self, report: &DeployReport) {
        for rollback in report.rollbacks().iter().filter(|r| !r.ok) {
            self.warn(Warning::rollback(format!(
                "release {} in {} was not rolled back: {}",
                rollback.name,
                rollback.namespace,
                rollback.error.as_deref().unwrap_or("unknown error")
            )));
        }
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn hook(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Hook,
            message: message.into(),
        }
    }

    pub fn rollback(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Rollback,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A post-deploy or on-error hook failed.
    Hook,
    /// Rollback could not uninstall a release; it may still be installed.
    Rollback,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::RollbackOutcome;
    use crate::types::{Namespace, ReleaseName};

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(Warning::hook("test").kind, WarningKind::Hook);
        assert_eq!(Warning::rollback("test").kind, WarningKind::Rollback);
    }

    #[test]
    fn collects_failed_rollbacks_only() {
        let mut report = DeployReport::new();
        for (name, ok) in [("a", true), ("b", false)] {
            report.record_rollback(RollbackOutcome {
                name: ReleaseName::new(name).unwrap(),
                namespace: Namespace::new("ns").unwrap(),
                ok,
                error: (!ok).then(|| "release: not found".to_string()),
            });
        }

        let mut diag = Diagnostics::default();
        diag.collect_rollbacks(&report);

        assert_eq!(diag.warnings().len(), 1);
        assert_eq!(diag.warnings()[0].kind, WarningKind::Rollback);
        assert!(diag.warnings()[0].message.contains("release b in ns"));
    }
}
