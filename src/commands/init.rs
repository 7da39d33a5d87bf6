// ABOUTME: Init command implementation.
// ABOUTME: Writes a starter tugboat.yml into the current directory.

use std::path::Path;
use tugboat::config::{CONFIG_FILENAME, Environment, init_config};
use tugboat::error::Result;
use tugboat::output::Output;

pub fn init(cwd: &Path, environment: Environment, force: bool, output: &Output) -> Result<()> {
    init_config(cwd, environment, force)?;
    output.success(&format!("Created {CONFIG_FILENAME} for {environment}"));
    Ok(())
}
