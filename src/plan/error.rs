// ABOUTME: Error types for dependency planning.
// ABOUTME: Planning errors are raised before any release client call.

use crate::types::ReleaseName;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A release lists a dependency that is not defined in the config.
    #[error("release '{release}' depends on unknown release '{dependency}'")]
    UnknownDependency {
        release: ReleaseName,
        dependency: ReleaseName,
    },

    /// The dependency relation contains at least one cycle.
    #[error("cyclic dependency detected among releases: {}", join(.involved))]
    CyclicDependency { involved: Vec<ReleaseName> },

    /// Two releases share a name.
    #[error("release '{0}' is defined more than once")]
    DuplicateRelease(ReleaseName),
}

fn join(names: &[ReleaseName]) -> String {
    names
        .iter()
        .map(ReleaseName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
