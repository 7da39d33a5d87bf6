// ABOUTME: Dependency planner producing a deterministic deployment order.
// ABOUTME: Validates dependency references and rejects cycles before anything is deployed.

mod error;

pub use error::PlanError;

use std::collections::{BTreeSet, HashMap};

use crate::config::{ClusterConfig, ReleaseSpec};
use crate::events::{EventBus, EventKind};
use crate::types::ReleaseName;

/// Releases in the order they must be deployed.
#[derive(Debug, Clone)]
pub struct Plan<'a> {
    releases: Vec<&'a ReleaseSpec>,
}

impl<'a> Plan<'a> {
    pub fn releases(&self) -> &[&'a ReleaseSpec] {
        &self.releases
    }

    pub fn names(&self) -> Vec<ReleaseName> {
        self.releases.iter().map(|r| r.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ReleaseSpec> + '_ {
        self.releases.iter().copied()
    }
}

/// Compute the deployment order for `config`.
///
/// Emits `PlanComputed` on success and `PlanFailed` before returning an error.
/// Releases with no ordering constraint between them keep their input order.
pub fn compute_plan<'a>(config: &'a ClusterConfig, bus: &EventBus) -> Result<Plan<'a>, PlanError> {
    match order(&config.releases) {
        Ok(indices) => {
            let plan = Plan {
                releases: indices.into_iter().map(|i| &config.releases[i]).collect(),
            };
            tracing::debug!(releases = plan.len(), "plan computed");
            bus.emit(EventKind::PlanComputed {
                order: plan.names(),
            });
            Ok(plan)
        }
        Err(e) => {
            tracing::debug!("planning failed: {}", e);
            bus.emit(EventKind::PlanFailed {
                error: e.to_string(),
            });
            Err(e)
        }
    }
}

/// Kahn's algorithm over input indices; the ready set always yields the
/// smallest input index first.
fn order(releases: &[ReleaseSpec]) -> Result<Vec<usize>, PlanError> {
    let mut index: HashMap<&ReleaseName, usize> = HashMap::with_capacity(releases.len());
    for (i, release) in releases.iter().enumerate() {
        if index.insert(&release.name, i).is_some() {
            return Err(PlanError::DuplicateRelease(release.name.clone()));
        }
    }

    let mut in_degree = vec![0usize; releases.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); releases.len()];

    for (i, release) in releases.iter().enumerate() {
        let mut seen = BTreeSet::new();
        for dependency in &release.dependencies {
            let &dep = index
                .get(dependency)
                .ok_or_else(|| PlanError::UnknownDependency {
                    release: release.name.clone(),
                    dependency: dependency.clone(),
                })?;
            if seen.insert(dep) {
                dependents[dep].push(i);
                in_degree[i] += 1;
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..releases.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut sorted = Vec::with_capacity(releases.len());

    while let Some(next) = ready.pop_first() {
        sorted.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if sorted.len() != releases.len() {
        let involved = (0..releases.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| releases[i].name.clone())
            .collect();
        return Err(PlanError::CyclicDependency { involved });
    }

    Ok(sorted)
}
