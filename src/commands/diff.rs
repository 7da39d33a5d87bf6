// ABOUTME: Diff command implementation.
// ABOUTME: Runs helm diff for every release in plan order.

use serde::Serialize;
use tugboat::client::{HelmCli, ReleaseClient};
use tugboat::config::ClusterConfig;
use tugboat::error::Result;
use tugboat::events::{EventBus, RunContext};
use tugboat::output::Output;
use tugboat::plan::compute_plan;
use tugboat::types::ReleaseName;

#[derive(Serialize)]
struct DiffRecord<'a> {
    event: &'static str,
    release: &'a ReleaseName,
    diff: &'a str,
}

pub async fn diff(config: &ClusterConfig, output: &Output) -> Result<()> {
    let bus = EventBus::silent(RunContext::for_config(config));
    let plan = compute_plan(config, &bus)?;
    let helm = HelmCli::from_config(config);

    for release in plan.iter() {
        output.progress(&format!("==> {} ({})", release.name, release.namespace));
        let diff = helm.diff(release).await?;
        output.json(&DiffRecord {
            event: "diff",
            release: &release.name,
            diff: &diff,
        });
        if diff.trim().is_empty() {
            output.progress("  no changes");
        } else {
            output.plain(diff.trim_end());
        }
    }
    Ok(())
}
