use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use pin_replay::io;
use pin_replay::{
    project, Action, Allocation, AllocationError, ChannelState, DeviceKind, Event, EventLog,
    PlaybackCommand, ProjectedState, Replay, ReplayConfig, SharedLog,
};

fn scenario_log() -> EventLog {
    EventLog::new(vec![
        Event::digital(0.0, 17, 0),
        Event::digital(0.5, 17, 1),
        Event::duty_cycle(1.5, 12, 50),
    ])
}

fn level(level: i64) -> ChannelState {
    ChannelState {
        level,
        frequency: None,
    }
}

#[test]
fn projects_scenario_and_gates_on_allocation() {
    let log = scenario_log();

    assert_eq!(
        project(&log, 0.2),
        ProjectedState::from_iter([(17, level(0))])
    );
    assert_eq!(
        project(&log, 1.0),
        ProjectedState::from_iter([(17, level(1))])
    );
    assert_eq!(
        project(&log, 2.0),
        ProjectedState::from_iter([(17, level(1)), (12, level(50))])
    );

    let used = log.used_channels();
    assert_eq!(used, BTreeSet::from([12, 17]));

    let mut allocation = Allocation::new();
    let first = allocation.add_device(DeviceKind::Led);
    allocation.assign(first, "pin", 17).unwrap();
    assert!(!allocation.is_complete(&used));
    assert_eq!(allocation.available_channels(&used), BTreeSet::from([12]));

    let second = allocation.add_device(DeviceKind::Buzzer);
    allocation.assign(second, "pin", 12).unwrap();
    assert!(allocation.is_complete(&used));
    assert!(allocation.available_channels(&used).is_empty());
}

#[test]
fn rejects_double_claim_until_vacated() {
    let mut allocation = Allocation::new();
    let a = allocation.add_device(DeviceKind::Led);
    let b = allocation.add_device(DeviceKind::Led);

    allocation.assign(a, "pin", 17).unwrap();
    assert!(matches!(
        allocation.assign(b, "pin", 17),
        Err(AllocationError::ChannelClaimed { channel: 17, .. })
    ));

    assert_eq!(allocation.vacate(a, "pin").unwrap(), Some(17));
    allocation.assign(b, "pin", 17).unwrap();
    assert_eq!(allocation.owner_of(17), Some((b, "pin")));
}

#[test]
fn plays_scenario_through_replay() {
    let mut replay = Replay::new(scenario_log(), 2.0, &ReplayConfig::default()).unwrap();
    // events at time 0 are already applied when paused at 0
    assert_eq!(
        replay.projection(),
        &ProjectedState::from_iter([(17, level(0))])
    );

    replay.play();
    let frame = replay.tick(1.0);
    assert_eq!(frame.snapshot.cursor, 1.0);
    assert_eq!(frame.projection.level(17), 1);
    assert!(frame.projection.get(12).is_none());

    // 1.0 + 5.0 overshoots: clamps and stops in the same tick
    let frame = replay.tick(5.0);
    assert!(frame.reached_end);
    assert_eq!(frame.snapshot.cursor, 2.0);
    assert!(!frame.snapshot.playing);
    assert_eq!(frame.projection.level(12), 50);

    let frame = replay.tick(1.0);
    assert!(!frame.reached_end);

    // play at the end starts over
    replay.play();
    assert_eq!(replay.snapshot().cursor, 0.0);
    assert!(replay.snapshot().playing);
}

#[test]
fn drives_replay_from_command_queue() {
    use std::collections::VecDeque;

    let mut replay = Replay::new(scenario_log(), 2.0, &ReplayConfig::default()).unwrap();
    let mut queue = VecDeque::from([
        PlaybackCommand::Seek(1.6),
        PlaybackCommand::SetSpeed(2.0),
        PlaybackCommand::Play,
    ]);

    assert_eq!(replay.drain(&mut queue).unwrap(), 3);
    assert_eq!(replay.projection().level(12), 50);
    assert_eq!(replay.snapshot().speed, 2.0);

    let frame = replay.tick(0.1);
    assert!((frame.snapshot.cursor - 1.8).abs() < 1e-9);
}

#[test]
fn loads_runner_output_and_replays() {
    let json = r#"{
        "program": "traffic.py",
        "logs": [
            {"time": 0.0, "action": "GPIO.output", "pin": 17, "value": 0},
            {"time": 0.5, "action": "GPIO.output", "pin": 17, "value": true},
            {"time": 1.5, "action": "PWM.ChangeDutyCycle", "pin": 12, "value": 50.0},
            {"time": 1.7, "action": "GPIO.setup", "pin": 5, "value": 0}
        ],
        "used_pins": [17, 12],
        "input_settings": {"duration": 2}
    }"#;

    let config = ReplayConfig::default();
    let run = io::load_str(json, &config).unwrap();
    assert_eq!(run.duration, 2.0);
    assert_eq!(run.log.events()[3].action, Action::Unknown("GPIO.setup".into()));

    let at_end = project(&run.log, 2.0);
    assert_eq!(
        at_end,
        ProjectedState::from_iter([(17, level(1)), (12, level(50))])
    );

    let mut allocation = Allocation::new();
    allocation.add_suggested(DeviceKind::Led, &run.used_channels).unwrap();
    allocation.add_suggested(DeviceKind::Led, &run.used_channels).unwrap();
    assert!(allocation.is_complete(&run.used_channels));
}

#[test]
fn readers_keep_their_log_across_replace() {
    let shared = Arc::new(SharedLog::new(scenario_log()));
    let before = shared.snapshot();

    thread::scope(|s| {
        s.spawn(|| {
            shared.replace(EventLog::new(vec![Event::digital(0.0, 4, 1)]));
        });
        s.spawn(|| {
            // whichever log this sees, it sees all of it
            let log = shared.snapshot();
            let state = project(&log, 10.0);
            assert!(state == ProjectedState::from_iter([(4, level(1))]) || state.len() == 2);
        });
    });

    assert_eq!(project(&before, 2.0).len(), 2);
    assert_eq!(shared.snapshot().used_channels(), BTreeSet::from([4]));
}
