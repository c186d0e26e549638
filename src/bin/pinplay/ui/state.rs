//! Shared state types for UI communication
//!
//! Static data is computed once before the playback thread starts;
//! per-frame updates carry only the clock and the projection.

use std::collections::BTreeMap;

use pin_replay::{
    Action, Allocation, Channel, DeviceKind, EventLog, PlaybackSnapshot, ProjectedState,
    SimulationRun,
};

/// Frame sent from the playback thread
#[derive(Clone, Debug)]
pub struct FrameUpdate {
    pub snapshot: PlaybackSnapshot,
    pub projection: ProjectedState,
}

/// One declared device as shown in the device panel
#[derive(Clone, Debug)]
pub struct DeviceRow {
    pub label: String,
    pub kind: DeviceKind,
    /// (slot, channel) for every wired slot
    pub pins: Vec<(&'static str, Channel)>,
}

/// Static state built once at startup (can allocate)
#[derive(Clone, Debug)]
pub struct UiStateInit {
    pub program: String,
    pub duration: f64,
    pub devices: Vec<DeviceRow>,
    /// Intervals (start, end) in seconds during which each channel is on
    pub activity: BTreeMap<Channel, Vec<(f64, f64)>>,
}

impl UiStateInit {
    pub fn new(run: &SimulationRun, allocation: &Allocation) -> Self {
        let devices = allocation
            .devices()
            .iter()
            .map(|device| DeviceRow {
                label: format!("{} {}", device.kind(), device.id()),
                kind: device.kind(),
                pins: device
                    .slots()
                    .iter()
                    .filter_map(|slot| slot.channel.map(|ch| (slot.name, ch)))
                    .collect(),
            })
            .collect();

        Self {
            program: run.program.clone().unwrap_or_else(|| "simulation".into()),
            duration: run.duration,
            devices,
            activity: activity_spans(&run.log, run.duration),
        }
    }
}

/// On-intervals per channel, closed at `duration` if still on at the end
pub fn activity_spans(log: &EventLog, duration: f64) -> BTreeMap<Channel, Vec<(f64, f64)>> {
    let mut spans: BTreeMap<Channel, Vec<(f64, f64)>> = BTreeMap::new();
    let mut open: BTreeMap<Channel, f64> = BTreeMap::new();

    for event in log.events() {
        let level = match event.action {
            Action::SetDigital | Action::SetDutyCycle => event.value,
            Action::ChannelStop => 0,
            // frequency changes and unknown actions leave the level alone
            _ => continue,
        };
        spans.entry(event.channel).or_default();

        match (level != 0, open.get(&event.channel).copied()) {
            (true, None) => {
                open.insert(event.channel, event.time);
            }
            (false, Some(start)) => {
                open.remove(&event.channel);
                spans.entry(event.channel).or_default().push((start, event.time));
            }
            _ => {}
        }
    }

    for (channel, start) in open {
        spans.entry(channel).or_default().push((start, duration.max(start)));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pin_replay::Event;

    #[test]
    fn test_activity_spans() {
        let log = EventLog::new(vec![
            Event::digital(0.0, 17, 1),
            Event::digital(1.0, 17, 0),
            Event::duty_cycle(0.5, 18, 50),
            Event::frequency(0.7, 18, 440),
            Event::digital(2.0, 17, 1),
            Event::digital(0.2, 22, 0),
        ]);

        let spans = activity_spans(&log, 3.0);
        assert_eq!(spans[&17], vec![(0.0, 1.0), (2.0, 3.0)]);
        assert_eq!(spans[&18], vec![(0.5, 3.0)]);
        assert!(spans[&22].is_empty());
    }

    #[test]
    fn test_stop_closes_span() {
        let log = EventLog::new(vec![Event::duty_cycle(0.0, 18, 30), Event::stop(1.5, 18)]);
        assert_eq!(activity_spans(&log, 5.0)[&18], vec![(0.0, 1.5)]);
    }
}
