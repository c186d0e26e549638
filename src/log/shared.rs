//! Copy-on-replace handle for the current run's log
//!
//! Readers take an `Arc` snapshot and keep it for as long as they like.
//! Starting a new run swaps the `Arc`; the old log is never edited, so a
//! projection already in flight finishes against the log it started with.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::EventLog;

#[derive(Debug, Default)]
pub struct SharedLog {
    current: RwLock<Arc<EventLog>>,
}

impl SharedLog {
    pub fn new(log: EventLog) -> Self {
        Self {
            current: RwLock::new(Arc::new(log)),
        }
    }

    /// The log of the current run
    pub fn snapshot(&self) -> Arc<EventLog> {
        self.current.read().clone()
    }

    /// Install the log of a new run, returning the previous one
    pub fn replace(&self, log: EventLog) -> Arc<EventLog> {
        let next = Arc::new(log);
        debug!(events = next.len(), "replacing event log");
        std::mem::replace(&mut *self.current.write(), next)
    }
}
