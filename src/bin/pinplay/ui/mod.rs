//! TUI module for pinplay
//!
//! Shows the transport, every declared device and a per-pin timeline.

mod channels;
pub mod state;
mod timeline;
mod transport;

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use tracing::warn;

use pin_replay::{PlaybackCommand, PlaybackSnapshot, ProjectedState, ReplayConfig};

pub use state::{FrameUpdate, UiStateInit};

use channels::render_devices;
use timeline::render_timeline;
use transport::render_transport;

/// Seconds moved by `[` and `]`
const SEEK_STEP: f64 = 1.0;

/// UI application state
pub struct UiApp {
    /// Ring buffer sender for playback commands
    command_tx: Producer<PlaybackCommand>,
    /// Ring buffer receiver for projected frames
    frame_rx: Consumer<FrameUpdate>,
    static_state: UiStateInit,
    config: ReplayConfig,
    /// Latest received frame
    snapshot: PlaybackSnapshot,
    projection: ProjectedState,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        command_tx: Producer<PlaybackCommand>,
        frame_rx: Consumer<FrameUpdate>,
        static_state: UiStateInit,
        config: ReplayConfig,
    ) -> Self {
        let snapshot = PlaybackSnapshot {
            cursor: 0.0,
            duration: static_state.duration,
            playing: false,
            speed: config.initial_speed,
        };
        Self {
            command_tx,
            frame_rx,
            static_state,
            config,
            snapshot,
            projection: ProjectedState::new(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_frames();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep only the latest frame
    fn poll_frames(&mut self) {
        while let Ok(update) = self.frame_rx.pop() {
            self.snapshot = update.snapshot;
            self.projection = update.projection;
        }
    }

    fn send(&mut self, command: PlaybackCommand) {
        if self.command_tx.push(command).is_err() {
            warn!(?command, "command queue full, dropping");
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let command = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char(' ') => PlaybackCommand::Toggle,
            KeyCode::Char('s') | KeyCode::Char('S') => PlaybackCommand::Stop,
            KeyCode::Right => PlaybackCommand::StepForward,
            KeyCode::Left => PlaybackCommand::StepBackward,
            KeyCode::Char(']') => PlaybackCommand::SeekBy(SEEK_STEP),
            KeyCode::Char('[') => PlaybackCommand::SeekBy(-SEEK_STEP),
            KeyCode::Home => PlaybackCommand::Seek(0.0),
            KeyCode::End => PlaybackCommand::Seek(self.static_state.duration),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                match self.config.preset(index) {
                    Some(speed) => PlaybackCommand::SetSpeed(speed),
                    None => return,
                }
            }
            _ => return,
        };
        self.send(command);
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let device_rows = self.static_state.devices.len() as u16 + 2;

        // Main layout: transport, devices, timeline, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),           // Transport bar
                Constraint::Length(device_rows), // Devices
                Constraint::Min(4),              // Timeline
                Constraint::Length(1),           // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.static_state, &self.snapshot);
        render_devices(frame, chunks[1], &self.static_state, &self.projection);

        let timeline_block = Block::default().title(" Timeline ").borders(Borders::ALL);
        let timeline_inner = timeline_block.inner(chunks[2]);
        frame.render_widget(timeline_block, chunks[2]);
        render_timeline(
            frame,
            timeline_inner,
            &self.static_state,
            &self.snapshot,
            &self.projection,
        );

        let help = Paragraph::new(
            " [Q] Quit  [Space] Play/Pause  [S] Stop  [←/→] Step  [[/]] Seek 1s  [Home/End] Jump  [1-5] Speed",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
