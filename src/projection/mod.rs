//! State reconstruction - what every channel looks like at a given time
//!
//! [`project`] folds the sorted log up to the query time with a
//! last-write-wins rule per channel and attribute. It is a pure function of
//! `(log, time)`; [`ProjectionIndex`] produces the same output faster by
//! resuming from precomputed checkpoints.

mod index;

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::log::{Action, Event, EventLog};
use crate::Channel;

pub use index::ProjectionIndex;

/// Reconstructed state of one channel
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// Digital level or duty cycle; nonzero means "on"
    pub level: i64,
    /// Carrier frequency in Hz, if one was ever set
    pub frequency: Option<i64>,
}

impl ChannelState {
    pub fn is_on(&self) -> bool {
        self.level != 0
    }
}

/// Every touched channel's state at one instant
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedState {
    channels: BTreeMap<Channel, ChannelState>,
}

impl ProjectedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Unknown actions are no-ops and don't create an entry.
    pub fn apply(&mut self, event: &Event) {
        if !event.action.is_known() {
            return;
        }

        let state = self.channels.entry(event.channel).or_default();
        match event.action {
            Action::SetDigital | Action::SetDutyCycle => state.level = event.value,
            Action::SetFrequency => state.frequency = Some(event.value),
            Action::ChannelStop => state.level = 0,
            Action::Unknown(_) => {}
        }
    }

    pub fn get(&self, channel: Channel) -> Option<&ChannelState> {
        self.channels.get(&channel)
    }

    /// State of `channel`, defaulting to low with no frequency
    pub fn state(&self, channel: Channel) -> ChannelState {
        self.get(channel).copied().unwrap_or_default()
    }

    pub fn level(&self, channel: Channel) -> i64 {
        self.state(channel).level
    }

    pub fn frequency(&self, channel: Channel) -> Option<i64> {
        self.state(channel).frequency
    }

    pub fn is_on(&self, channel: Channel) -> bool {
        self.state(channel).is_on()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &ChannelState)> {
        self.channels.iter().map(|(&ch, state)| (ch, state))
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl FromIterator<(Channel, ChannelState)> for ProjectedState {
    fn from_iter<I: IntoIterator<Item = (Channel, ChannelState)>>(iter: I) -> Self {
        Self {
            channels: iter.into_iter().collect(),
        }
    }
}

/// Clamp a query time into the log's domain; negative and NaN behave as 0
pub(crate) fn query_time(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.max(0.0)
    }
}

/// Reconstruct every channel's state at `time`.
///
/// Applies, in log order, each event with `event.time <= time` and stops at
/// the first later event.
pub fn project(log: &EventLog, time: f64) -> ProjectedState {
    let time = query_time(time);
    let mut state = ProjectedState::new();
    for event in log.events() {
        if event.time > time {
            break;
        }
        state.apply(event);
    }
    state
}
