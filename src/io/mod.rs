//! Loading simulation results produced by the remote runner
//!
//! The runner answers with a JSON document:
//!
//! ```json
//! {
//!   "program": "blink.py",
//!   "duration": 2.013,
//!   "logs": [
//!     { "time": 0.0, "action": "GPIO.output", "pin": 17, "value": 1 },
//!     { "time": 1.0, "action": "PWM.stop", "pin": 18, "value": null }
//!   ],
//!   "used_pins": [17, 18],
//!   "input_settings": { "duration": 5 }
//! }
//! ```
//!
//! Records that fail to parse or validate are skipped one by one; only an
//! unreadable document or a runner-reported failure is an error.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ReplayConfig;
use crate::log::{EventLog, RawEvent};
use crate::Channel;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read simulation result: {0}")]
    Io(#[from] std::io::Error),
    #[error("simulation result is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("simulation failed: {0}")]
    Failed(String),
}

#[derive(Debug, Default, Deserialize)]
struct InputSettings {
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SimulationFile {
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    lab: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    logs: Vec<serde_json::Value>,
    #[serde(default)]
    used_pins: Option<Vec<i64>>,
    #[serde(default)]
    input_settings: Option<InputSettings>,
    #[serde(default)]
    error: Option<String>,
}

/// One simulation run, ready for allocation and playback
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub log: EventLog,
    /// Playback length in seconds, always finite and positive
    pub duration: f64,
    /// Channels the devices must cover
    pub used_channels: BTreeSet<Channel>,
    pub program: Option<String>,
    pub lab: Option<String>,
}

/// Pick the first usable declared duration, else derive one from the log
pub fn resolve_duration(declared: &[Option<f64>], log: &EventLog, config: &ReplayConfig) -> f64 {
    declared
        .iter()
        .flatten()
        .copied()
        .find(|d| d.is_finite() && *d > 0.0)
        .unwrap_or_else(|| log.derive_duration(config.duration_margin, config.min_duration))
}

impl SimulationRun {
    fn from_file(file: SimulationFile, config: &ReplayConfig) -> Result<Self, LoadError> {
        if let Some(message) = file.error {
            return Err(LoadError::Failed(message));
        }

        let raw: Vec<RawEvent> = file
            .logs
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<RawEvent>(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(index, %err, "skipping unparseable event");
                    None
                }
            })
            .collect();
        let log = EventLog::from_raw(raw);

        let settings_duration = file.input_settings.and_then(|s| s.duration);
        let duration = resolve_duration(&[settings_duration, file.duration], &log, config);

        let used_channels = match file.used_pins {
            Some(pins) => pins
                .into_iter()
                .filter_map(|p| Channel::try_from(p).ok())
                .collect(),
            None => log.used_channels(),
        };

        debug!(
            events = log.len(),
            duration,
            channels = used_channels.len(),
            "simulation result loaded"
        );

        Ok(Self {
            log,
            duration,
            used_channels,
            program: file.program,
            lab: file.lab,
        })
    }
}

pub fn load_str(json: &str, config: &ReplayConfig) -> Result<SimulationRun, LoadError> {
    let file: SimulationFile = serde_json::from_str(json)?;
    SimulationRun::from_file(file, config)
}

pub fn load_reader<R: Read>(reader: R, config: &ReplayConfig) -> Result<SimulationRun, LoadError> {
    let file: SimulationFile = serde_json::from_reader(reader)?;
    SimulationRun::from_file(file, config)
}

pub fn load_path(path: impl AsRef<Path>, config: &ReplayConfig) -> Result<SimulationRun, LoadError> {
    let file = File::open(path)?;
    load_reader(BufReader::new(file), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{Action, Event};

    #[test]
    fn test_load_runner_output() {
        let json = r#"{
            "program": "buzzer.py",
            "lab": "buzzer",
            "start_time": 1718000000.5,
            "duration": 1.204,
            "logs": [
                {"time": 0.0, "action": "PWM.init", "pin": 18, "value": 440},
                {"time": 0.0, "action": "PWM.start", "pin": 18, "value": 50},
                {"time": 0.6, "action": "GPIO.output", "pin": 17, "value": true},
                {"time": 1.2, "action": "PWM.stop", "pin": 18, "value": null}
            ],
            "used_pins": [18, 17],
            "input_settings": {"lab": "buzzer", "duration": 5, "distance": 50}
        }"#;

        let run = load_str(json, &ReplayConfig::default()).unwrap();
        assert_eq!(run.program.as_deref(), Some("buzzer.py"));
        assert_eq!(run.duration, 5.0);
        assert_eq!(run.used_channels, BTreeSet::from([17, 18]));
        assert_eq!(run.log.len(), 4);
        assert_eq!(run.log.events()[2], Event::digital(0.6, 17, 1));
        assert_eq!(run.log.events()[3].action, Action::ChannelStop);
    }

    #[test]
    fn test_duration_fallbacks() {
        let config = ReplayConfig::default();

        let run = load_str(r#"{"duration": 2.5, "logs": []}"#, &config).unwrap();
        assert_eq!(run.duration, 2.5);

        let json = r#"{"logs": [{"time": 7.0, "action": "GPIO.output", "pin": 4, "value": 1}]}"#;
        let run = load_str(json, &config).unwrap();
        assert_eq!(run.duration, 7.5);

        let run = load_str(r#"{"duration": 0, "logs": []}"#, &config).unwrap();
        assert_eq!(run.duration, 5.0);
    }

    #[test]
    fn test_used_channels_from_log_when_absent() {
        let json = r#"{"logs": [
            {"time": 0.1, "action": "GPIO.output", "pin": 22, "value": 1},
            {"time": 0.2, "action": "GPIO.output", "pin": 27, "value": 0}
        ]}"#;
        let run = load_str(json, &ReplayConfig::default()).unwrap();
        assert_eq!(run.used_channels, BTreeSet::from([22, 27]));
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let json = r#"{"logs": [
            {"time": 0.1, "action": "GPIO.output", "pin": 22, "value": 1},
            {"action": "GPIO.output", "pin": 22, "value": 1},
            {"time": 0.2, "action": "GPIO.output", "pin": -4, "value": 1},
            {"time": 0.3, "action": "GPIO.cleanup", "pin": null, "value": null},
            "garbage"
        ]}"#;
        let run = load_str(json, &ReplayConfig::default()).unwrap();
        assert_eq!(run.log.len(), 1);
    }

    #[test]
    fn test_runner_failure() {
        let json = r#"{"error": "No log generated.", "status": "failed"}"#;
        assert!(matches!(
            load_str(json, &ReplayConfig::default()),
            Err(LoadError::Failed(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            load_str("{not json", &ReplayConfig::default()),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_path("/nonexistent/run.json", &ReplayConfig::default()),
            Err(LoadError::Io(_))
        ));
    }
}
