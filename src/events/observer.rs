// ABOUTME: Observer capability plus the logging and JSON-lines observers.
// ABOUTME: Observers receive every event of a run in emission order.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{Event, EventKind};

/// Receives lifecycle events.
///
/// Errors are reported back to the bus, which logs them and carries on.
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Event) -> Result<(), ObserverError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("observer rejected event: {0}")]
    Rejected(String),
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&self, event: &Event) -> Result<(), ObserverError> {
        let detail = serde_json::to_string(&event.kind)?;
        let kind = event.kind.name();
        let run_id = event.run_id.as_str();

        match &event.kind {
            EventKind::PlanFailed { .. }
            | EventKind::ReleaseFailed { .. }
            | EventKind::WaiterTimedOut { .. }
            | EventKind::RollbackResult { ok: false, .. } => {
                tracing::warn!(target: "tugboat::events", run_id, kind, "{}", detail);
            }
            _ => {
                tracing::info!(target: "tugboat::events", run_id, kind, "{}", detail);
            }
        }
        Ok(())
    }
}

/// Appends each event as one JSON object per line.
#[derive(Debug)]
pub struct JsonFileObserver {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonFileObserver {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ObserverError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Observer for JsonFileObserver {
    fn notify(&self, event: &Event) -> Result<(), ObserverError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut file = self.file.lock();
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }
}
