//! PinPlay - application builder and runner

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use color_eyre::eyre::{bail, eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use tracing::warn;

use pin_replay::{
    project, Allocation, Channel, DeviceKind, PlaybackCommand, Replay, ReplayConfig,
    SimulationRun,
};

use super::engine::Engine;
use super::ui::{FrameUpdate, UiApp, UiStateInit};

/// `KIND` or `KIND=SLOT:PIN,SLOT:PIN,...` from the command line
#[derive(Debug, Clone)]
pub struct DeviceSpec {
    kind: DeviceKind,
    slots: Vec<(String, Channel)>,
}

impl FromStr for DeviceSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, wiring) = match s.split_once('=') {
            Some((kind, wiring)) => (kind, Some(wiring)),
            None => (s, None),
        };
        let kind: DeviceKind = kind.trim().parse().map_err(|e| format!("{e}"))?;

        let mut slots = Vec::new();
        for pair in wiring.into_iter().flat_map(|w| w.split(',')) {
            let (slot, pin) = pair
                .split_once(':')
                .ok_or_else(|| format!("expected SLOT:PIN, got `{pair}`"))?;
            let pin: Channel = pin
                .trim()
                .trim_start_matches("GPIO")
                .parse()
                .map_err(|_| format!("`{pin}` is not a pin number"))?;
            slots.push((slot.trim().to_string(), pin));
        }

        Ok(Self { kind, slots })
    }
}

/// Main application builder
pub struct PinPlay {
    run: SimulationRun,
    config: ReplayConfig,
    allocation: Allocation,
}

impl PinPlay {
    pub fn new(run: SimulationRun, config: ReplayConfig) -> Self {
        Self {
            run,
            config,
            allocation: Allocation::new(),
        }
    }

    /// Declare devices. With none declared every pin gets its own LED.
    pub fn devices(mut self, specs: Vec<DeviceSpec>) -> EyreResult<Self> {
        let all = &self.run.used_channels;

        if specs.is_empty() {
            for _ in 0..all.len() {
                self.allocation
                    .add_suggested(DeviceKind::Led, all)
                    .wrap_err("cannot wire default LEDs")?;
            }
            return Ok(self);
        }

        for spec in specs {
            if spec.slots.is_empty() {
                let id = self
                    .allocation
                    .add_suggested(spec.kind, all)
                    .wrap_err_with(|| format!("cannot wire {}", spec.kind))?;
                if self.allocation.device(id).is_some_and(|d| !d.is_wired()) {
                    warn!(device = %id, kind = %spec.kind, "no wiring suggestion, device left empty");
                }
                continue;
            }

            let id = self.allocation.add_device(spec.kind);
            for (slot, pin) in &spec.slots {
                self.allocation
                    .assign(id, slot, *pin)
                    .wrap_err_with(|| format!("cannot wire {} slot `{}` to GPIO{}", spec.kind, slot, pin))?;
            }
        }

        Ok(self)
    }

    /// Playback only starts when every pin in the run has an owner
    fn ensure_complete(&self) -> EyreResult<()> {
        let all = &self.run.used_channels;
        if self.allocation.is_complete(all) {
            return Ok(());
        }

        let missing: Vec<String> = self
            .allocation
            .available_channels(all)
            .iter()
            .map(|ch| format!("GPIO{ch}"))
            .collect();
        bail!(
            "pins without a device: {} (declare them with --device)",
            missing.join(", ")
        )
    }

    /// Print every pin's state at `t` and exit
    pub fn print_at(&self, t: f64) -> EyreResult<()> {
        let state = project(&self.run.log, t);
        let program = self.run.program.as_deref().unwrap_or("simulation");

        println!("=== {} @ {:.3}s / {:.3}s ===", program, t, self.run.duration);
        for device in self.allocation.devices() {
            println!("{} {}", device.kind(), device.id());
            for slot in device.slots() {
                let Some(ch) = slot.channel else {
                    println!("  {:<5} -", slot.name);
                    continue;
                };
                let pin = state.state(ch);
                match pin.frequency {
                    Some(hz) => println!("  {:<5} GPIO{:<3} level {:>4}  {} Hz", slot.name, ch, pin.level, hz),
                    None => println!("  {:<5} GPIO{:<3} level {:>4}", slot.name, ch, pin.level),
                }
            }
        }

        for ch in self.allocation.available_channels(&self.run.used_channels) {
            println!("unmapped GPIO{:<3} level {:>4}", ch, state.level(ch));
        }

        Ok(())
    }

    /// Run the TUI (takes over the terminal until quit)
    pub fn run(self) -> EyreResult<()> {
        self.ensure_complete()?;

        let PinPlay {
            run,
            config,
            allocation,
        } = self;

        let init = UiStateInit::new(&run, &allocation);
        let mut replay = Replay::new(run.log, run.duration, &config)?;
        replay.play();

        // UI -> playback commands, playback -> UI frames
        let (command_tx, command_rx) = RingBuffer::<PlaybackCommand>::new(64);
        let (frame_tx, frame_rx) = RingBuffer::<FrameUpdate>::new(8);
        let shutdown = Arc::new(AtomicBool::new(false));

        let engine = Engine::new(replay, command_rx, frame_tx, Arc::clone(&shutdown)).spawn()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(command_tx, frame_rx, init, config).run(&mut terminal);
        ratatui::restore();

        shutdown.store(true, Ordering::Relaxed);
        engine
            .join()
            .map_err(|_| eyre!("playback thread panicked"))?;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_spec() {
        let spec: DeviceSpec = "ultrasonic=trig:27,echo:GPIO22".parse().unwrap();
        assert_eq!(spec.kind, DeviceKind::Ultrasonic);
        assert_eq!(
            spec.slots,
            vec![("trig".to_string(), 27), ("echo".to_string(), 22)]
        );

        let spec: DeviceSpec = "seven-segment".parse().unwrap();
        assert!(spec.slots.is_empty());

        assert!("led=pin".parse::<DeviceSpec>().is_err());
        assert!("led=pin:x".parse::<DeviceSpec>().is_err());
        assert!("servo".parse::<DeviceSpec>().is_err());
    }
}
