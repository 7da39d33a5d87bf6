// ABOUTME: Chart repository and release definitions.
// ABOUTME: A release names a chart, a target namespace and the releases it depends on.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::deserialize::{
    deserialize_namespace, deserialize_release_name, deserialize_release_names,
};
use crate::types::{Namespace, ReleaseName};

/// A named chart source.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSpec {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub oci: bool,
}

impl RepoSpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: None,
            password: None,
            oci: false,
        }
    }

    /// Credentials, only when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

/// Values passed to a release: files on disk plus an optional inline mapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValuesRef {
    #[serde(default)]
    pub inline: Option<serde_yaml::Mapping>,
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl ValuesRef {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.inline.as_ref().is_none_or(|m| m.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSpec {
    #[serde(deserialize_with = "deserialize_release_name")]
    pub name: ReleaseName,

    #[serde(deserialize_with = "deserialize_namespace")]
    pub namespace: Namespace,

    /// `repo/chart`, a local path or an `oci://` reference.
    pub chart: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub values: ValuesRef,

    #[serde(default, deserialize_with = "deserialize_release_names")]
    pub dependencies: Vec<ReleaseName>,

    #[serde(default = "default_true")]
    pub create_namespace: bool,

    #[serde(default = "default_true")]
    pub atomic: bool,

    #[serde(default = "default_true")]
    pub wait: bool,

    #[serde(default)]
    pub install_crds: bool,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Per-release hook scripts, run before lint and after the release is ready.
    #[serde(default)]
    pub hooks: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> Duration {
    Duration::from_secs(600)
}

impl ReleaseSpec {
    pub fn new(name: ReleaseName, namespace: Namespace, chart: impl Into<String>) -> Self {
        Self {
            name,
            namespace,
            chart: chart.into(),
            version: None,
            values: ValuesRef::default(),
            dependencies: Vec::new(),
            create_namespace: true,
            atomic: true,
            wait: true,
            install_crds: false,
            timeout: default_timeout(),
            hooks: Vec::new(),
        }
    }

    pub fn with_dependencies(
        mut self,
        dependencies: impl IntoIterator<Item = ReleaseName>,
    ) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_hooks(mut self, hooks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.hooks = hooks.into_iter().map(Into::into).collect();
        self
    }
}
