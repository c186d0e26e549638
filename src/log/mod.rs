//! Event log - the immutable, time-ordered record of one simulation run
//!
//! An [`EventLog`] is built once per run and never mutated afterwards.
//! Construction normalises the input: malformed records are dropped and an
//! unsorted log is stable-sorted by time, so every reader can rely on the
//! ordering without re-checking it.

mod event;
mod shared;

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::Channel;

pub use event::{Action, Event, Malformed, RawEvent, RawValue};
pub use shared::SharedLog;

/// Time-ordered, immutable sequence of events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Build a log from validated events, sorting by time if needed.
    ///
    /// The sort is stable, so events sharing a timestamp keep their arrival order.
    ///
    /// Events stamped with a NaN, infinite or negative time are dropped.
    pub fn new(mut events: Vec<Event>) -> Self {
        let mut index = 0;
        events.retain(|e| {
            let checked = event::check_time(e.time);
            if let Err(reason) = checked {
                warn!(index, %reason, channel = e.channel, "dropping event with invalid time");
            }
            index += 1;
            checked.is_ok()
        });

        let sorted = events.windows(2).all(|w| w[0].time <= w[1].time);
        if !sorted {
            debug!(events = events.len(), "event log out of order, re-sorting by time");
            events.sort_by(|a, b| a.time.total_cmp(&b.time));
        }
        Self { events }
    }

    /// Build a log from producer records, skipping the ones that don't validate
    pub fn from_raw(raw: impl IntoIterator<Item = RawEvent>) -> Self {
        let events = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match record.validate() {
                Ok(event) => Some(event),
                Err(reason) => {
                    warn!(index, %reason, action = %record.action, "skipping malformed event");
                    None
                }
            })
            .collect();
        Self::new(events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the last event (None for an empty log)
    pub fn last_time(&self) -> Option<f64> {
        self.events.last().map(|e| e.time)
    }

    /// Number of events with `time <= t`
    pub fn prefix_len(&self, t: f64) -> usize {
        self.events.partition_point(|e| e.time <= t)
    }

    /// Every channel referenced by any event, including unknown actions
    pub fn used_channels(&self) -> BTreeSet<Channel> {
        self.events.iter().map(|e| e.channel).collect()
    }

    /// Playback length for a run that declared none: `last_time + margin`, floored at `floor`
    pub fn derive_duration(&self, margin: f64, floor: f64) -> f64 {
        let last = self.last_time().unwrap_or(0.0);
        (last + margin).max(floor)
    }
}

impl From<Vec<Event>> for EventLog {
    fn from(events: Vec<Event>) -> Self {
        Self::new(events)
    }
}

impl FromIterator<Event> for EventLog {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
