// ABOUTME: Tunables of a deployment run: attempts, backoff, waiter and diff preview.
// ABOUTME: Defaults come from the config's deploy section; CLI flags override them.

use std::num::NonZeroU32;
use std::time::Duration;

use crate::config::settings::{default_backoff, default_retries, default_selector_key};
use crate::config::{ClusterConfig, DeploySettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Maximum install/upgrade attempts per release, first try included.
    pub retries: NonZeroU32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
    pub use_waiter: bool,
    /// Render a diff for every release before installing it.
    pub debug: bool,
    /// Label key of the readiness selector, `<key>=<release name>`.
    pub selector_key: String,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            retries: attempts(default_retries()),
            backoff: default_backoff(),
            use_waiter: false,
            debug: false,
            selector_key: default_selector_key(),
        }
    }
}

fn attempts(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

impl DeployOptions {
    pub fn from_settings(settings: &DeploySettings) -> Self {
        Self {
            retries: attempts(settings.retries),
            backoff: settings.backoff,
            use_waiter: settings.wait,
            debug: false,
            selector_key: settings.selector_key.clone(),
        }
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        Self::from_settings(&config.deploy).debug(config.helm.debug)
    }

    /// Set the attempt budget; zero is raised to one.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = attempts(retries);
        self
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn use_waiter(mut self, use_waiter: bool) -> Self {
        self.use_waiter = use_waiter;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn selector_key(mut self, key: impl Into<String>) -> Self {
        self.selector_key = key.into();
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.get()
    }
}
