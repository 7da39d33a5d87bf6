// ABOUTME: Readiness waiter backed by `kubectl wait`.
// ABOUTME: Bounds the child with its own timeout so a hung kubectl still reports a timeout.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::process::run_command;
use super::{WaitError, Waiter};
use crate::config::ClusterConfig;
use crate::types::Namespace;

/// Extra time granted to kubectl beyond its own `--timeout`.
const TIMEOUT_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct KubectlWaiter {
    binary: PathBuf,
    grace: Duration,
}

impl Default for KubectlWaiter {
    fn default() -> Self {
        Self::new()
    }
}

impl KubectlWaiter {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("kubectl"),
            grace: TIMEOUT_GRACE,
        }
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        Self::new().binary(&config.helm.kubectl)
    }

    pub fn binary(mut self, binary: impl AsRef<Path>) -> Self {
        self.binary = binary.as_ref().to_path_buf();
        self
    }

    pub fn grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn wait_args(
        namespace: &Namespace,
        selector: &str,
        timeout: Duration,
        context: Option<&str>,
    ) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(context) = context {
            args.push("--context".to_string());
            args.push(context.to_string());
        }
        args.extend([
            "wait".to_string(),
            "--for=condition=Ready".to_string(),
            "pod".to_string(),
            "-l".to_string(),
            selector.to_string(),
            "-n".to_string(),
            namespace.to_string(),
            format!("--timeout={}s", timeout.as_secs().max(1)),
        ]);
        args
    }
}

#[async_trait]
impl Waiter for KubectlWaiter {
    async fn wait(
        &self,
        namespace: &Namespace,
        selector: &str,
        timeout: Duration,
        context: Option<&str>,
    ) -> Result<(), WaitError> {
        let args = Self::wait_args(namespace, selector, timeout, context);
        let timed_out = || WaitError::TimedOut {
            namespace: namespace.clone(),
            selector: selector.to_string(),
            timeout,
        };

        let envs = HashMap::new();
        let run = run_command(&self.binary, &args, &envs, None);
        let output = match tokio::time::timeout(timeout + self.grace, run).await {
            Err(_) => return Err(timed_out()),
            Ok(result) => result.map_err(|e| {
                WaitError::Failed(format!("failed to run {}: {}", self.binary.display(), e))
            })?,
        };

        if output.exited_with(&[0]) {
            return Ok(());
        }

        let stderr = output.stderr.trim();
        if stderr.contains("timed out") {
            return Err(timed_out());
        }

        Err(WaitError::Failed(format!(
            "kubectl wait exited with {:?}: {}",
            output.code, stderr
        )))
    }
}
