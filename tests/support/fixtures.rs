// ABOUTME: Config and option builders shared by integration tests.
// ABOUTME: Releases live in namespace "ns" unless a test says otherwise.

use std::time::Duration;
use tugboat::config::{ClusterConfig, Environment, ReleaseSpec, RepoSpec};
use tugboat::deploy::DeployOptions;
use tugboat::types::{Namespace, ReleaseName};

pub fn name(s: &str) -> ReleaseName {
    ReleaseName::new(s).unwrap()
}

pub fn release(release_name: &str, deps: &[&str]) -> ReleaseSpec {
    ReleaseSpec::new(
        name(release_name),
        Namespace::new("ns").unwrap(),
        format!("repo/{release_name}"),
    )
    .with_dependencies(deps.iter().map(|d| name(d)))
}

pub fn config(releases: Vec<ReleaseSpec>) -> ClusterConfig {
    ClusterConfig::new(Environment::Dev).with_releases(releases)
}

pub fn config_with_repos(releases: Vec<ReleaseSpec>) -> ClusterConfig {
    config(releases).with_repos([
        RepoSpec::new("jetstack", "https://charts.jetstack.io"),
        RepoSpec::new("openstack", "https://tarballs.opendev.org/openstack/openstack-helm"),
    ])
}

/// Options with `attempts` attempts and no delay between them.
pub fn options(attempts: u32) -> DeployOptions {
    DeployOptions::default()
        .retries(attempts)
        .backoff(Duration::ZERO)
}

/// Write `script` to `path` and make it executable.
pub fn write_script(path: &std::path::Path, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, script).unwrap();
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}
