// ABOUTME: ReleaseClient implementation driving the helm CLI.
// ABOUTME: Builds helm argv from release specs and maps exit codes to errors.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::process::{CommandOutput, run_command};
use super::{ReleaseClient, ReleaseClientError};
use crate::config::{ClusterConfig, ReleaseSpec, RepoSpec};
use crate::types::{Namespace, ReleaseName};

/// helm-diff exits 2 when it found changes.
const DIFF_CHANGES_EXIT_CODE: i32 = 2;

/// Shells out to `helm` for every release operation.
#[derive(Debug, Clone)]
pub struct HelmCli {
    binary: PathBuf,
    kube_context: Option<String>,
    debug: bool,
    env: HashMap<String, String>,
}

impl Default for HelmCli {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmCli {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("helm"),
            kube_context: None,
            debug: false,
            env: HashMap::new(),
        }
    }

    /// Client configured from the config's `context` and `helm` section.
    pub fn from_config(config: &ClusterConfig) -> Self {
        let mut helm = Self::new()
            .binary(&config.helm.binary)
            .debug(config.helm.debug);
        if let Some(ref context) = config.context {
            helm = helm.kube_context(context);
        }
        helm
    }

    pub fn binary(mut self, binary: impl AsRef<Path>) -> Self {
        self.binary = binary.as_ref().to_path_buf();
        self
    }

    pub fn kube_context(mut self, context: impl Into<String>) -> Self {
        self.kube_context = Some(context.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(ref context) = self.kube_context {
            args.push("--kube-context".to_string());
            args.push(context.clone());
        }
        args
    }

    fn finish_args(&self, mut args: Vec<String>) -> Vec<String> {
        if self.debug {
            args.push("--debug".to_string());
        }
        args
    }

    /// Arguments for `helm upgrade --install`.
    pub fn upgrade_args(&self, release: &ReleaseSpec, values_files: &[PathBuf]) -> Vec<String> {
        let mut args = self.base_args();
        args.extend([
            "upgrade".to_string(),
            "--install".to_string(),
            release.name.to_string(),
            release.chart.clone(),
            "-n".to_string(),
            release.namespace.to_string(),
        ]);
        args.extend(values_args(values_files));

        if let Some(ref version) = release.version {
            args.push("--version".to_string());
            args.push(version.clone());
        }
        if release.create_namespace {
            args.push("--create-namespace".to_string());
        }
        if release.atomic {
            args.push("--atomic".to_string());
        }
        if release.wait {
            args.push("--wait".to_string());
            args.push("--timeout".to_string());
            args.push(format!("{}s", release.timeout.as_secs()));
        }
        if release.install_crds {
            args.push("--install-crds".to_string());
        }
        self.finish_args(args)
    }

    /// Arguments for validating a chart: `helm lint` for local charts,
    /// `helm show chart` for repository and OCI references.
    pub fn lint_args(&self, release: &ReleaseSpec, values_files: &[PathBuf]) -> Vec<String> {
        let mut args = self.base_args();
        if Path::new(&release.chart).exists() {
            args.extend(["lint".to_string(), release.chart.clone()]);
            args.extend(values_args(values_files));
        } else {
            args.extend(["show".to_string(), "chart".to_string(), release.chart.clone()]);
            if let Some(ref version) = release.version {
                args.push("--version".to_string());
                args.push(version.clone());
            }
        }
        self.finish_args(args)
    }

    pub fn diff_args(&self, release: &ReleaseSpec, values_files: &[PathBuf]) -> Vec<String> {
        let mut args = self.base_args();
        args.extend([
            "diff".to_string(),
            "upgrade".to_string(),
            release.name.to_string(),
            release.chart.clone(),
            "-n".to_string(),
            release.namespace.to_string(),
        ]);
        args.extend(values_args(values_files));
        if let Some(ref version) = release.version {
            args.push("--version".to_string());
            args.push(version.clone());
        }
        self.finish_args(args)
    }

    async fn run(
        &self,
        args: Vec<String>,
        stdin: Option<&str>,
        allowed: &[i32],
    ) -> Result<CommandOutput, ReleaseClientError> {
        let output = run_command(&self.binary, &args, &self.env, stdin)
            .await
            .map_err(|source| ReleaseClientError::Spawn {
                program: self.binary.display().to_string(),
                source,
            })?;

        if output.exited_with(allowed) {
            return Ok(output);
        }

        Err(ReleaseClientError::CommandFailed {
            program: self.binary.display().to_string(),
            command: subcommand(&args),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

/// Values files for a release; inline values are written to a temp file
/// that must outlive the helm invocation.
fn prepare_values(
    release: &ReleaseSpec,
) -> Result<(Vec<PathBuf>, Option<NamedTempFile>), ReleaseClientError> {
    let mut files = release.values.files.clone();

    let inline = match release.values.inline {
        Some(ref mapping) if !mapping.is_empty() => mapping,
        _ => return Ok((files, None)),
    };

    let values_error = |reason: String| ReleaseClientError::Values {
        release: release.name.clone(),
        reason,
    };

    let yaml = serde_yaml::to_string(inline).map_err(|e| values_error(e.to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix(&format!("{}-values-", release.name))
        .suffix(".yaml")
        .tempfile()
        .map_err(|e| values_error(e.to_string()))?;
    temp.write_all(yaml.as_bytes())
        .map_err(|e| values_error(e.to_string()))?;

    files.push(temp.path().to_path_buf());
    Ok((files, Some(temp)))
}

fn values_args(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .flat_map(|f| ["-f".to_string(), f.display().to_string()])
        .collect()
}

/// First two non-flag words, for error messages ("repo add", "upgrade").
fn subcommand(args: &[String]) -> String {
    let mut words = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--kube-context" {
            skip_next = true;
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        words.push(arg.as_str());
        if words.len() == 2 {
            break;
        }
    }
    words.join(" ")
}

/// Registry host of an `oci://host/path` URL.
fn oci_host(url: &str) -> &str {
    let rest = url.strip_prefix("oci://").unwrap_or(url);
    rest.split('/').next().unwrap_or(rest)
}

#[async_trait]
impl ReleaseClient for HelmCli {
    async fn add_repo(&self, repo: &RepoSpec) -> Result<(), ReleaseClientError> {
        let mut args = self.base_args();

        if repo.oci {
            // OCI registries are not added as repos; only authentication applies.
            let Some((user, password)) = repo.credentials() else {
                tracing::debug!("skipping repo add for OCI registry {}", repo.name);
                return Ok(());
            };
            args.extend([
                "registry".to_string(),
                "login".to_string(),
                oci_host(&repo.url).to_string(),
                "--username".to_string(),
                user.to_string(),
                "--password-stdin".to_string(),
            ]);
            self.run(self.finish_args(args), Some(password), &[0]).await?;
            return Ok(());
        }

        args.extend([
            "repo".to_string(),
            "add".to_string(),
            repo.name.clone(),
            repo.url.clone(),
            "--force-update".to_string(),
        ]);
        let password = match repo.credentials() {
            Some((user, password)) => {
                args.extend([
                    "--username".to_string(),
                    user.to_string(),
                    "--password-stdin".to_string(),
                ]);
                Some(password)
            }
            None => None,
        };
        self.run(self.finish_args(args), password, &[0]).await?;
        Ok(())
    }

    async fn update_repos(&self) -> Result<(), ReleaseClientError> {
        let mut args = self.base_args();
        args.extend(["repo".to_string(), "update".to_string()]);

        match self.run(self.finish_args(args), None, &[0]).await {
            Err(ReleaseClientError::CommandFailed { ref stderr, .. })
                if stderr.contains("no repositories") =>
            {
                tracing::debug!("no helm repositories configured, nothing to update");
                Ok(())
            }
            other => other.map(|_| ()),
        }
    }

    async fn lint(&self, release: &ReleaseSpec) -> Result<(), ReleaseClientError> {
        let (files, _inline) = prepare_values(release)?;
        self.run(self.lint_args(release, &files), None, &[0]).await?;
        Ok(())
    }

    async fn upgrade_install(&self, release: &ReleaseSpec) -> Result<(), ReleaseClientError> {
        let (files, _inline) = prepare_values(release)?;
        let output = self.run(self.upgrade_args(release, &files), None, &[0]).await?;
        tracing::debug!("helm upgrade {}: {}", release.name, output.stdout.trim_end());
        Ok(())
    }

    async fn uninstall(
        &self,
        name: &ReleaseName,
        namespace: &Namespace,
    ) -> Result<(), ReleaseClientError> {
        let mut args = self.base_args();
        args.extend([
            "uninstall".to_string(),
            name.to_string(),
            "-n".to_string(),
            namespace.to_string(),
        ]);
        self.run(self.finish_args(args), None, &[0]).await?;
        Ok(())
    }

    async fn diff(&self, release: &ReleaseSpec) -> Result<String, ReleaseClientError> {
        let (files, _inline) = prepare_values(release)?;
        let output = self
            .run(
                self.diff_args(release, &files),
                None,
                &[0, DIFF_CHANGES_EXIT_CODE],
            )
            .await?;
        Ok(output.stdout)
    }
}
