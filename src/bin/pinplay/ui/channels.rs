//! Device panel - current state of every declared device

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use pin_replay::{DeviceKind, ProjectedState};

use super::state::DeviceRow;
use super::UiStateInit;

fn on_style(on: bool) -> Style {
    if on {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn device_line(device: &DeviceRow, projection: &ProjectedState) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!(" {:<20}", device.label),
        Style::default().fg(Color::White),
    )];

    match device.kind {
        DeviceKind::SevenSegment => {
            // lit segment letters, digit selects shown separately
            for (slot, channel) in &device.pins {
                let on = projection.is_on(*channel);
                let text = if on { slot.to_string() } else { "·".repeat(slot.len()) };
                spans.push(Span::styled(format!("{text} "), on_style(on)));
            }
        }
        DeviceKind::Buzzer => {
            for (_, channel) in &device.pins {
                let state = projection.state(*channel);
                let tone = match state.frequency {
                    Some(hz) if state.is_on() => format!("♪ {hz} Hz @ {}%", state.level),
                    _ if state.is_on() => format!("♪ {}%", state.level),
                    _ => "silent".to_string(),
                };
                spans.push(Span::styled(
                    format!("GPIO{channel:<3} {tone}"),
                    on_style(state.is_on()),
                ));
            }
        }
        DeviceKind::Led | DeviceKind::Ultrasonic => {
            for (slot, channel) in &device.pins {
                let level = projection.level(*channel);
                let lamp = if level != 0 { "●" } else { "○" };
                spans.push(Span::styled(
                    format!("{slot}:GPIO{channel:<3} {lamp} {level:<4} "),
                    on_style(level != 0),
                ));
            }
        }
    }

    Line::from(spans)
}

/// Render one line per device
pub fn render_devices(
    frame: &mut Frame,
    area: Rect,
    static_state: &UiStateInit,
    projection: &ProjectedState,
) {
    let lines: Vec<Line> = static_state
        .devices
        .iter()
        .map(|device| device_line(device, projection))
        .collect();

    let block = Block::default().title(" Devices ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
