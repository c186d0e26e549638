//! Playback clock - the virtual-time cursor driven by real elapsed time
//!
//! Two states, paused and playing, with the run's duration as a ceiling.
//! The host calls [`PlaybackClock::tick`] once per frame with the real time
//! since the previous frame; nothing here reads a wall clock, so a test can
//! drive it with fixed steps.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PlaybackError;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Paused,
    Playing,
}

/// Copy of the clock's state, published after every mutation
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub cursor: f64,
    pub duration: f64,
    pub playing: bool,
    pub speed: f64,
}

impl PlaybackSnapshot {
    /// Cursor as a fraction of the duration
    pub fn progress(&self) -> f64 {
        self.cursor / self.duration
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Virtual time in seconds, always within [0, duration]
    cursor: f64,
    duration: f64,
    playing: bool,
    /// Virtual seconds per real second
    speed: f64,
}

fn check_speed(speed: f64) -> Result<f64, PlaybackError> {
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(PlaybackError::InvalidSpeed(speed))
    }
}

impl PlaybackClock {
    /// Paused clock at 0 with normal speed
    pub fn new(duration: f64) -> Result<Self, PlaybackError> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(PlaybackError::InvalidDuration(duration));
        }
        Ok(Self {
            cursor: 0.0,
            duration,
            playing: false,
            speed: 1.0,
        })
    }

    pub fn with_speed(mut self, speed: f64) -> Result<Self, PlaybackError> {
        self.speed = check_speed(speed)?;
        Ok(self)
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn state(&self) -> ClockState {
        if self.playing {
            ClockState::Playing
        } else {
            ClockState::Paused
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            cursor: self.cursor,
            duration: self.duration,
            playing: self.playing,
            speed: self.speed,
        }
    }

    /// Progress through the run, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        self.cursor / self.duration
    }

    pub fn is_at_start(&self) -> bool {
        self.cursor == 0.0
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.duration
    }

    /// Start playback; a clock parked at the end restarts from 0
    pub fn play(&mut self) {
        if self.cursor >= self.duration {
            self.cursor = 0.0;
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Toggle play/pause
    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Pause and rewind to the start
    pub fn stop(&mut self) {
        self.playing = false;
        self.cursor = 0.0;
    }

    /// Move the cursor, clamped to [0, duration]. Play state is untouched.
    pub fn seek(&mut self, t: f64) {
        self.cursor = if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, self.duration)
        };
    }

    pub fn seek_by(&mut self, delta: f64) {
        self.seek(self.cursor + delta);
    }

    pub fn seek_to_start(&mut self) {
        self.seek(0.0);
    }

    pub fn seek_to_end(&mut self) {
        self.seek(self.duration);
    }

    pub fn step_forward(&mut self, frame: f64) {
        self.seek_by(frame.abs());
    }

    pub fn step_backward(&mut self, frame: f64) {
        self.seek_by(-frame.abs());
    }

    /// Change the time scale used by subsequent ticks
    pub fn set_speed(&mut self, speed: f64) -> Result<(), PlaybackError> {
        self.speed = check_speed(speed)?;
        Ok(())
    }

    /// Advance by `elapsed` real seconds scaled by speed.
    ///
    /// Returns true only on the tick that reaches the end and pauses the clock.
    pub fn tick(&mut self, elapsed: f64) -> bool {
        if !self.playing || !elapsed.is_finite() || elapsed < 0.0 {
            return false;
        }

        let next = self.cursor + elapsed * self.speed;
        if next >= self.duration {
            self.cursor = self.duration;
            self.playing = false;
            debug!(duration = self.duration, "playback reached end");
            return true;
        }

        self.cursor = next;
        false
    }
}
