//! pinplay - terminal replay of GPIO simulation logs
//!
//! Run with: cargo run -- run.json --device led=pin:17 --device seven-segment

mod app;
mod engine;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use pin_replay::{io, ReplayConfig};
use tracing_subscriber::EnvFilter;

use app::{DeviceSpec, PinPlay};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a GPIO simulation log in the terminal")]
struct Args {
    /// Simulation result JSON written by the runner
    log: PathBuf,
    /// Initial playback speed (1.0 = real time)
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
    /// Device to wire pins to, e.g. `led=pin:17`, `ultrasonic=trig:27,echo:22`
    /// or a bare `seven-segment` to use its standard wiring (repeatable)
    #[arg(long = "device", value_name = "KIND[=SLOT:PIN,...]")]
    devices: Vec<DeviceSpec>,
    /// Print pin states at this time and exit. Unlike playback this does not
    /// require every pin to have a device; unclaimed pins print as `unmapped`
    #[arg(long, value_name = "SECONDS")]
    at: Option<f64>,
    /// Write logs to this file while the TUI runs
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_tracing(args: &Args) -> EyreResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if args.at.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else if let Some(path) = &args.log_file {
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    // TUI without a log file: stay silent, stderr would draw over the screen

    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(&args)?;

    let config = ReplayConfig::default().with_speed(args.speed);
    let run = io::load_path(&args.log, &config)
        .wrap_err_with(|| format!("failed to load {}", args.log.display()))?;

    let app = PinPlay::new(run, config).devices(args.devices)?;

    match args.at {
        Some(t) => app.print_at(t),
        None => app.run(),
    }
}
