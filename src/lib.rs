//! Replay of recorded GPIO activity.
//!
//! A simulation run produces a time-ordered log of pin events. This crate
//! rebuilds the state of every pin at any instant ([`projection`]), drives
//! a play/pause/seek/speed clock over the run ([`playback`]) and checks
//! that every referenced pin is wired to a declared device before playback
//! starts ([`devices`]).

pub mod config;
pub mod devices; // Pin-to-device allocation
#[cfg(feature = "serde")]
pub mod io;
pub mod log; // Event log and its normalisation
pub mod playback; // Virtual-time clock
pub mod projection; // State reconstruction

/// Hardware pin number
pub type Channel = u32;

pub use config::ReplayConfig;
pub use devices::{Allocation, AllocationError, DeviceKind};
pub use log::{Action, Event, EventLog, SharedLog};
pub use playback::{PlaybackClock, PlaybackCommand, PlaybackError, PlaybackSnapshot, Replay};
pub use projection::{project, ChannelState, ProjectedState, ProjectionIndex};

#[cfg(feature = "serde")]
pub use io::{LoadError, SimulationRun};
