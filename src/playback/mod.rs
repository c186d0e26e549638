//! Playback - a user-controllable clock feeding the projection every frame
//!
//! - [`PlaybackClock`]: play/pause/stop/seek/speed state machine with auto-stop at the end
//! - [`PlaybackCommand`]: queued user actions, drained by the clock's owner
//! - [`Replay`]: one run's log, its projection index and a clock, producing a [`Frame`] per tick
//!
//! # Example
//!
//! ```
//! use pin_replay::{log::{Event, EventLog}, playback::Replay, ReplayConfig};
//!
//! let log = EventLog::new(vec![Event::digital(0.5, 17, 1)]);
//! let mut replay = Replay::new(log, 2.0, &ReplayConfig::default()).unwrap();
//!
//! replay.play();
//! let frame = replay.tick(1.0);
//! assert_eq!(frame.projection.level(17), 1);
//! ```

mod clock;
mod command;
mod replay;

pub use clock::{ClockState, PlaybackClock, PlaybackSnapshot};
pub use command::{CommandReceiver, PlaybackCommand};
pub use replay::{Frame, Replay};

/// Errors raised by playback operations
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("duration must be finite and positive, got {0}")]
    InvalidDuration(f64),
    #[error("speed must be finite and positive, got {0}")]
    InvalidSpeed(f64),
}
