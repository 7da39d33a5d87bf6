// ABOUTME: Cluster configuration types and parsing for tugboat.yml.
// ABOUTME: Handles env var expansion, YAML parsing and config file discovery.

mod deserialize;
mod expand;
mod init;
mod release;
pub(crate) mod settings;

pub use expand::expand_env;
pub use init::init_config;
pub use release::{ReleaseSpec, RepoSpec, ValuesRef};
pub use settings::{DeploySettings, HelmSettings};

use crate::error::{Error, Result};
use crate::types::ReleaseName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILENAME: &str = "tugboat.yml";
pub const CONFIG_FILENAME_ALT: &str = "tugboat.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".tugboat/config.yml";

/// Target environment a configuration describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Environment::Dev),
            "staging" => Ok(Environment::Staging),
            "prod" => Ok(Environment::Prod),
            other => Err(format!(
                "unknown environment '{other}' (expected dev, staging or prod)"
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved input of one deployment run.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub environment: Environment,

    /// Kubernetes context passed to helm and kubectl.
    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub repos: Vec<RepoSpec>,

    #[serde(default)]
    pub releases: Vec<ReleaseSpec>,

    #[serde(default)]
    pub helm: HelmSettings,

    #[serde(default)]
    pub deploy: DeploySettings,
}

impl ClusterConfig {
    pub fn new(environment: Environment) -> Self {
        ClusterConfig {
            environment,
            context: None,
            repos: Vec::new(),
            releases: Vec::new(),
            helm: HelmSettings::default(),
            deploy: DeploySettings::default(),
        }
    }

    pub fn with_repos(mut self, repos: impl IntoIterator<Item = RepoSpec>) -> Self {
        self.repos = repos.into_iter().collect();
        self
    }

    pub fn with_releases(mut self, releases: impl IntoIterator<Item = ReleaseSpec>) -> Self {
        self.releases = releases.into_iter().collect();
        self
    }

    /// Parse YAML after expanding `${VAR}` references.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let expanded = expand_env(yaml)?;
        serde_yaml::from_str(&expanded).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("loading config from {}", path.display());
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        Self::discover_path(dir).and_then(|path| Self::load(&path))
    }

    pub fn discover_path(dir: &Path) -> Result<PathBuf> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        candidates
            .into_iter()
            .find(|path| path.exists())
            .ok_or_else(|| Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn release(&self, name: &ReleaseName) -> Option<&ReleaseSpec> {
        self.releases.iter().find(|r| &r.name == name)
    }
}
