// ABOUTME: Identifier correlating every event emitted during one deployment run.
// ABOUTME: Combines host name, process id and start time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(String);

impl RunId {
    /// Generate an id for a run starting now on this host.
    pub fn generate() -> Self {
        Self::from_parts(
            &gethostname::gethostname().to_string_lossy(),
            std::process::id(),
            Utc::now(),
        )
    }

    fn from_parts(host: &str, pid: u32, started_at: DateTime<Utc>) -> Self {
        Self(format!(
            "{}-{}-{}",
            host,
            pid,
            started_at.format("%Y%m%dT%H%M%S%3f")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_host_pid_and_time() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap();
        let id = RunId::from_parts("deploy-box", 4242, at);
        assert_eq!(id.as_str(), "deploy-box-4242-20260301T123005000");
    }

    #[test]
    fn generated_ids_contain_pid() {
        let id = RunId::generate();
        assert!(id.as_str().contains(&std::process::id().to_string()));
    }
}
