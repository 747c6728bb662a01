//! Nullable event sink: keeps every event for later assertions.

use crate::lock;
use civitas_governance::{EventSink, GovernanceEvent};
use std::sync::{Arc, Mutex};

/// Records events in emission order. Clones share the same log.
#[derive(Clone, Default)]
pub struct NullEventSink {
    events: Arc<Mutex<Vec<GovernanceEvent>>>,
}

impl NullEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GovernanceEvent> {
        lock(&self.events).clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut *lock(&self.events))
    }
}

impl EventSink for NullEventSink {
    fn emit(&mut self, event: GovernanceEvent) {
        lock(&self.events).push(event);
    }
}
