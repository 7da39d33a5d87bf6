// ABOUTME: Fan-out dispatcher delivering events to registered observers.
// ABOUTME: Observer failures are logged and never interrupt a deployment.

use chrono::Utc;
use std::sync::Arc;

use super::{Event, EventKind, Observer, RunContext};

/// Delivers events to observers in registration order.
pub struct EventBus {
    observers: Vec<Arc<dyn Observer>>,
    context: RunContext,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("run_id", &self.context.run_id)
            .finish()
    }
}

impl EventBus {
    pub fn new(observers: Vec<Arc<dyn Observer>>, context: RunContext) -> Self {
        Self { observers, context }
    }

    /// A bus with no observers.
    pub fn silent(context: RunContext) -> Self {
        Self::new(Vec::new(), context)
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Stamp `kind` with the run context and deliver it.
    pub fn emit(&self, kind: EventKind) {
        let event = Event {
            ts: Utc::now(),
            run_id: self.context.run_id.clone(),
            environment: self.context.environment,
            kube_context: self.context.kube_context.clone(),
            kind,
        };
        self.notify_all(&event);
    }

    fn notify_all(&self, event: &Event) {
        for observer in &self.observers {
            if let Err(e) = observer.notify(event) {
                tracing::warn!(event = event.kind.name(), "observer failed: {}", e);
            }
        }
    }
}
