//! Replay - drives the projection from the playback clock
//!
//! Owns one run: the shared immutable log, its projection index and the
//! clock. Every tick advances the clock and re-projects at the new cursor;
//! every user action re-projects too, so [`Replay::frame`] is always current.

use std::sync::Arc;

use tracing::debug;

use super::{CommandReceiver, PlaybackClock, PlaybackCommand, PlaybackError, PlaybackSnapshot};
use crate::config::ReplayConfig;
use crate::log::EventLog;
use crate::projection::{ProjectedState, ProjectionIndex};

/// What consumers see after a tick or a user action
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub snapshot: PlaybackSnapshot,
    pub projection: &'a ProjectedState,
    /// Set on the tick where playback ran into the end
    pub reached_end: bool,
}

#[derive(Debug)]
pub struct Replay {
    index: ProjectionIndex,
    clock: PlaybackClock,
    frame_step: f64,
    checkpoint_stride: usize,
    projection: ProjectedState,
}

impl Replay {
    /// Start a run paused at 0
    pub fn new(
        log: impl Into<Arc<EventLog>>,
        duration: f64,
        config: &ReplayConfig,
    ) -> Result<Self, PlaybackError> {
        let clock = PlaybackClock::new(duration)?.with_speed(config.initial_speed)?;
        let index = ProjectionIndex::new(log.into(), config.checkpoint_stride);
        let projection = index.project(clock.cursor());

        Ok(Self {
            index,
            clock,
            frame_step: config.frame_step,
            checkpoint_stride: config.checkpoint_stride,
            projection,
        })
    }

    /// Replace the run. The clock starts over paused at 0, keeping its speed.
    ///
    /// On error the current run is left untouched.
    pub fn load_run(
        &mut self,
        log: impl Into<Arc<EventLog>>,
        duration: f64,
    ) -> Result<(), PlaybackError> {
        let clock = PlaybackClock::new(duration)?.with_speed(self.clock.speed())?;
        let log = log.into();
        debug!(events = log.len(), duration, "loading new run");

        self.index = ProjectionIndex::new(log, self.checkpoint_stride);
        self.clock = clock;
        self.reproject();
        Ok(())
    }

    pub fn log(&self) -> &Arc<EventLog> {
        self.index.log()
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.clock.snapshot()
    }

    pub fn projection(&self) -> &ProjectedState {
        &self.projection
    }

    /// Current frame without advancing time
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            snapshot: self.clock.snapshot(),
            projection: &self.projection,
            reached_end: false,
        }
    }

    /// State at an arbitrary time, independent of the cursor
    pub fn project_at(&self, time: f64) -> ProjectedState {
        self.index.project(time)
    }

    /// Advance by `elapsed` real seconds and project at the new cursor
    pub fn tick(&mut self, elapsed: f64) -> Frame<'_> {
        let reached_end = self.clock.tick(elapsed);
        self.reproject();
        Frame {
            snapshot: self.clock.snapshot(),
            projection: &self.projection,
            reached_end,
        }
    }

    pub fn play(&mut self) {
        self.clock.play();
        self.reproject();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn toggle(&mut self) {
        self.clock.toggle();
        self.reproject();
    }

    pub fn stop(&mut self) {
        self.clock.stop();
        self.reproject();
    }

    pub fn seek(&mut self, t: f64) {
        self.clock.seek(t);
        self.reproject();
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), PlaybackError> {
        self.clock.set_speed(speed)
    }

    pub fn apply(&mut self, command: PlaybackCommand) -> Result<(), PlaybackError> {
        let result = self.clock.apply(command, self.frame_step);
        self.reproject();
        result
    }

    /// Apply all queued commands; see [`PlaybackClock::drain`]
    pub fn drain<R: CommandReceiver + ?Sized>(&mut self, rx: &mut R) -> Result<usize, PlaybackError> {
        let result = self.clock.drain(rx, self.frame_step);
        self.reproject();
        result
    }

    fn reproject(&mut self) {
        self.projection = self.index.project(self.clock.cursor());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::log::Event;

    fn replay() -> Replay {
        let log = EventLog::new(vec![
            Event::digital(0.0, 17, 0),
            Event::digital(0.5, 17, 1),
            Event::duty_cycle(1.5, 12, 50),
        ]);
        Replay::new(log, 2.0, &ReplayConfig::default()).unwrap()
    }

    #[test]
    fn test_new_replay_is_paused_at_start() {
        let replay = replay();
        let frame = replay.frame();
        assert!(!frame.snapshot.playing);
        assert_eq!(frame.snapshot.cursor, 0.0);
        assert_eq!(frame.projection.level(17), 0);
    }

    #[test]
    fn test_tick_projects_at_cursor() {
        let mut replay = replay();
        replay.play();

        let frame = replay.tick(1.0);
        assert_eq!(frame.snapshot.cursor, 1.0);
        assert_eq!(frame.projection.level(17), 1);
        assert!(frame.projection.get(12).is_none());

        let frame = replay.tick(5.0);
        assert!(frame.reached_end);
        assert!(!frame.snapshot.playing);
        assert_eq!(frame.snapshot.cursor, 2.0);
        assert_eq!(frame.projection.level(12), 50);
    }

    #[test]
    fn test_seek_reprojects_while_paused() {
        let mut replay = replay();
        replay.seek(1.6);
        assert_eq!(replay.projection().level(12), 50);

        replay.stop();
        assert!(replay.projection().get(12).is_none());
    }

    #[test]
    fn test_drain_reprojects() {
        let mut replay = replay();
        let mut queue = VecDeque::from([PlaybackCommand::Seek(0.75), PlaybackCommand::StepForward]);
        replay.drain(&mut queue).unwrap();
        assert_eq!(replay.projection().level(17), 1);
        assert!(replay.snapshot().cursor > 0.75);
    }

    #[test]
    fn test_project_at_ignores_cursor() {
        let replay = replay();
        assert_eq!(replay.project_at(2.0).level(12), 50);
        assert_eq!(replay.snapshot().cursor, 0.0);
    }

    #[test]
    fn test_load_run_resets_clock_keeps_speed() {
        let mut replay = replay();
        replay.set_speed(2.0).unwrap();
        replay.play();
        replay.tick(0.5);

        let next = EventLog::new(vec![Event::digital(0.0, 5, 1)]);
        replay.load_run(next, 3.0).unwrap();

        let snap = replay.snapshot();
        assert_eq!(snap.cursor, 0.0);
        assert_eq!(snap.duration, 3.0);
        assert!(!snap.playing);
        assert_eq!(snap.speed, 2.0);
        assert_eq!(replay.projection().level(5), 1);
        assert!(replay.projection().get(17).is_none());
    }

    #[test]
    fn test_load_run_rejects_bad_duration() {
        let mut replay = replay();
        assert!(replay.load_run(EventLog::default(), 0.0).is_err());
        assert_eq!(replay.log().len(), 3);
    }

    #[test]
    fn test_invalid_initial_speed() {
        let config = ReplayConfig::default().with_speed(0.0);
        assert!(matches!(
            Replay::new(EventLog::default(), 1.0, &config),
            Err(PlaybackError::InvalidSpeed(_))
        ));
    }
}
