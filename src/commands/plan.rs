// ABOUTME: Plan command implementation.
// ABOUTME: Prints the dependency order without touching the cluster.

use serde::Serialize;
use std::sync::Arc;
use tugboat::config::ClusterConfig;
use tugboat::error::Result;
use tugboat::events::{EventBus, LogObserver, RunContext};
use tugboat::output::Output;
use tugboat::plan::compute_plan;
use tugboat::types::ReleaseName;

#[derive(Serialize)]
struct PlanRecord {
    event: &'static str,
    order: Vec<ReleaseName>,
}

pub fn plan(config: &ClusterConfig, output: &Output) -> Result<()> {
    let bus = EventBus::new(vec![Arc::new(LogObserver)], RunContext::for_config(config));
    let plan = compute_plan(config, &bus)?;

    output.json(&PlanRecord {
        event: "plan",
        order: plan.names(),
    });
    for (i, release) in plan.iter().enumerate() {
        let line = if release.dependencies.is_empty() {
            format!("{:>3}. {} ({})", i + 1, release.name, release.namespace)
        } else {
            let deps: Vec<&str> = release.dependencies.iter().map(|d| d.as_str()).collect();
            format!(
                "{:>3}. {} ({}) after {}",
                i + 1,
                release.name,
                release.namespace,
                deps.join(", ")
            )
        };
        output.plain(&line);
    }
    Ok(())
}
