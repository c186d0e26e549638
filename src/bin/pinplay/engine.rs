//! Engine - the playback thread
//!
//! Owns the [`Replay`] outright. The UI never touches it directly: commands
//! arrive over one ring buffer and projected frames leave over another.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rtrb::{Consumer, Producer};
use tracing::{debug, info, trace, warn};

use pin_replay::{PlaybackCommand, Replay};

use super::ui::FrameUpdate;

/// Roughly one display frame
const TICK_INTERVAL: Duration = Duration::from_millis(16);

pub struct Engine {
    replay: Replay,
    commands: Consumer<PlaybackCommand>,
    frames: Producer<FrameUpdate>,
    shutdown: Arc<AtomicBool>,
}

impl Engine {
    pub fn new(
        replay: Replay,
        commands: Consumer<PlaybackCommand>,
        frames: Producer<FrameUpdate>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            replay,
            commands,
            frames,
            shutdown,
        }
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("playback".into())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        debug!(duration = self.replay.clock().duration(), "playback thread started");
        let mut last = Instant::now();

        while !self.shutdown.load(Ordering::Relaxed) {
            if let Err(err) = self.replay.drain(&mut self.commands) {
                warn!(%err, "playback command rejected");
            }

            let now = Instant::now();
            let elapsed = now.duration_since(last).as_secs_f64();
            last = now;

            let frame = self.replay.tick(elapsed);
            if frame.reached_end {
                info!("reached end of run");
            }
            let update = FrameUpdate {
                snapshot: frame.snapshot,
                projection: frame.projection.clone(),
            };

            if !publish(&mut self.frames, update) {
                trace!("frame ring full, frame skipped");
            }

            thread::sleep(TICK_INTERVAL);
        }

        debug!("playback thread stopped");
    }
}

/// Push a frame unless the ring is full.
///
/// A full ring means the UI has not drained the frames already queued. Those
/// stay where they are and this newer one is discarded; the UI catches up on
/// the next tick's frame. Returns whether the frame was queued.
fn publish(frames: &mut Producer<FrameUpdate>, update: FrameUpdate) -> bool {
    frames.push(update).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pin_replay::{PlaybackSnapshot, ProjectedState};
    use rtrb::RingBuffer;

    fn frame_at(cursor: f64) -> FrameUpdate {
        FrameUpdate {
            snapshot: PlaybackSnapshot {
                cursor,
                duration: 5.0,
                playing: true,
                speed: 1.0,
            },
            projection: ProjectedState::new(),
        }
    }

    #[test]
    fn test_full_ring_skips_newest_frame() {
        let (mut tx, mut rx) = RingBuffer::<FrameUpdate>::new(2);

        assert!(publish(&mut tx, frame_at(0.1)));
        assert!(publish(&mut tx, frame_at(0.2)));
        assert!(!publish(&mut tx, frame_at(0.3)));

        assert_eq!(rx.pop().unwrap().snapshot.cursor, 0.1);
        assert_eq!(rx.pop().unwrap().snapshot.cursor, 0.2);
        assert!(rx.pop().is_err());

        // once drained, the next tick's frame gets through
        assert!(publish(&mut tx, frame_at(0.4)));
        assert_eq!(rx.pop().unwrap().snapshot.cursor, 0.4);
    }
}
