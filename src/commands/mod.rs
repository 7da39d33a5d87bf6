// ABOUTME: Command module aggregator for the tugboat CLI.
// ABOUTME: Re-exports command handlers and the shared config loader.

mod deploy;
mod diff;
mod init;
mod plan;

pub use deploy::{DeployArgs, deploy};
pub use diff::diff;
pub use init::init;
pub use plan::plan;

use std::path::{Path, PathBuf};
use tugboat::config::ClusterConfig;
use tugboat::error::Result;

/// Load the config from `explicit` or discover it in `cwd`.
///
/// Returns the config together with the project directory hooks are looked up in.
pub fn load_config(cwd: &Path, explicit: Option<&Path>) -> Result<(ClusterConfig, PathBuf)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => ClusterConfig::discover_path(cwd)?,
    };
    let config = ClusterConfig::load(&path)?;
    Ok((config, cwd.to_path_buf()))
}
