// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a starter tugboat.yml.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Environment};

pub fn init_config(dir: &Path, environment: Environment, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, template_yaml(environment))?;
    Ok(())
}

fn template_yaml(environment: Environment) -> String {
    format!(
        r#"environment: {environment}
# context: kind-{environment}

repos:
  - name: jetstack
    url: https://charts.jetstack.io

releases:
  - name: cert-manager
    namespace: cert-manager
    chart: jetstack/cert-manager
    values:
      inline:
        crds:
          enabled: true
  # - name: my-app
  #   namespace: apps
  #   chart: ./charts/my-app
  #   dependencies: [cert-manager]
  #   timeout: 5m

deploy:
  retries: 2
  backoff: 2s
"#
    )
}
