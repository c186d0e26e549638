//! Replay configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Knobs for a replay session.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayConfig {
    /// Playback speed a new session starts with (1.0 = real time)
    pub initial_speed: f64,
    /// Seconds moved by a single step forward/backward (~one 60fps frame)
    pub frame_step: f64,
    /// Speeds offered by the transport controls
    pub speed_presets: Vec<f64>,
    /// Events between projection checkpoints
    pub checkpoint_stride: usize,
    /// Padding added after the last event when a run declares no duration
    pub duration_margin: f64,
    /// Shortest derived duration
    pub min_duration: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            initial_speed: 1.0,
            frame_step: 1.0 / 60.0,
            speed_presets: vec![0.1, 0.5, 1.0, 2.0, 5.0],
            checkpoint_stride: 256,
            duration_margin: 0.5,
            min_duration: 5.0,
        }
    }
}

impl ReplayConfig {
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.initial_speed = speed;
        self
    }

    pub fn with_frame_step(mut self, seconds: f64) -> Self {
        self.frame_step = seconds;
        self
    }

    pub fn with_checkpoint_stride(mut self, stride: usize) -> Self {
        self.checkpoint_stride = stride;
        self
    }

    /// Margin and floor used when deriving a duration from the log
    pub fn with_duration_fallback(mut self, margin: f64, min_duration: f64) -> Self {
        self.duration_margin = margin;
        self.min_duration = min_duration;
        self
    }

    /// Speed preset by position, as bound to the number keys
    pub fn preset(&self, index: usize) -> Option<f64> {
        self.speed_presets.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReplayConfig::default();
        assert_eq!(config.initial_speed, 1.0);
        assert_eq!(config.preset(2), Some(1.0));
        assert_eq!(config.preset(4), Some(5.0));
        assert_eq!(config.preset(5), None);
    }

    #[test]
    fn test_builder() {
        let config = ReplayConfig::default()
            .with_speed(2.0)
            .with_checkpoint_stride(32)
            .with_duration_fallback(1.0, 3.0);
        assert_eq!(config.initial_speed, 2.0);
        assert_eq!(config.checkpoint_stride, 32);
        assert_eq!(config.duration_margin, 1.0);
        assert_eq!(config.min_duration, 3.0);
    }
}
