// ABOUTME: Tool settings embedded in the cluster config file.
// ABOUTME: Covers helm/kubectl invocation and deploy retry defaults.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct HelmSettings {
    #[serde(default = "default_helm_binary")]
    pub binary: PathBuf,
    #[serde(default = "default_kubectl_binary")]
    pub kubectl: PathBuf,
    #[serde(default)]
    pub debug: bool,
}

fn default_helm_binary() -> PathBuf {
    PathBuf::from("helm")
}

fn default_kubectl_binary() -> PathBuf {
    PathBuf::from("kubectl")
}

impl Default for HelmSettings {
    fn default() -> Self {
        HelmSettings {
            binary: default_helm_binary(),
            kubectl: default_kubectl_binary(),
            debug: false,
        }
    }
}

/// Deploy defaults; CLI flags override them.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploySettings {
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_backoff", with = "humantime_serde")]
    pub backoff: Duration,

    #[serde(default)]
    pub wait: bool,

    #[serde(default = "default_selector_key")]
    pub selector_key: String,
}

pub(crate) fn default_retries() -> u32 {
    2
}

pub(crate) fn default_backoff() -> Duration {
    Duration::from_secs(2)
}

pub(crate) fn default_selector_key() -> String {
    "app.kubernetes.io/instance".to_string()
}

impl Default for DeploySettings {
    fn default() -> Self {
        DeploySettings {
            retries: default_retries(),
            backoff: default_backoff(),
            wait: false,
            selector_key: default_selector_key(),
        }
    }
}
