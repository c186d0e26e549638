#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use super::{PlaybackClock, PlaybackError};

/// User playback actions, queued for whoever owns the clock
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Toggle,
    Stop,
    Seek(f64),
    SeekBy(f64),
    SetSpeed(f64),
    StepForward,
    StepBackward,
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<PlaybackCommand>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<PlaybackCommand> {
    fn pop(&mut self) -> Option<PlaybackCommand> {
        Consumer::pop(self).ok()
    }
}

impl CommandReceiver for std::collections::VecDeque<PlaybackCommand> {
    fn pop(&mut self) -> Option<PlaybackCommand> {
        self.pop_front()
    }
}

impl PlaybackClock {
    /// Apply one queued command. `frame_step` is the distance of a single step.
    pub fn apply(&mut self, command: PlaybackCommand, frame_step: f64) -> Result<(), PlaybackError> {
        match command {
            PlaybackCommand::Play => self.play(),
            PlaybackCommand::Pause => self.pause(),
            PlaybackCommand::Toggle => self.toggle(),
            PlaybackCommand::Stop => self.stop(),
            PlaybackCommand::Seek(t) => self.seek(t),
            PlaybackCommand::SeekBy(delta) => self.seek_by(delta),
            PlaybackCommand::SetSpeed(speed) => self.set_speed(speed)?,
            PlaybackCommand::StepForward => self.step_forward(frame_step),
            PlaybackCommand::StepBackward => self.step_backward(frame_step),
        }
        Ok(())
    }

    /// Apply every pending command, in order.
    ///
    /// A rejected command doesn't stop the rest from applying; the first
    /// error is returned once the queue is empty.
    pub fn drain<R: CommandReceiver + ?Sized>(
        &mut self,
        rx: &mut R,
        frame_step: f64,
    ) -> Result<usize, PlaybackError> {
        let mut applied = 0;
        let mut first_err = None;
        while let Some(command) = rx.pop() {
            match self.apply(command, frame_step) {
                Ok(()) => applied += 1,
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(applied),
        }
    }
}
