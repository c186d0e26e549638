//! Transport bar widget - shows play state, cursor, speed and progress

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use pin_replay::PlaybackSnapshot;

use super::UiStateInit;

/// Render the transport bar
pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    static_state: &UiStateInit,
    snapshot: &PlaybackSnapshot,
) {
    let block = Block::default()
        .title(format!(" pinplay: {} ", static_state.program))
        .borders(Borders::ALL);

    let play_symbol = if snapshot.playing { "▶" } else { "⏸" };
    let play_state_str = if snapshot.playing {
        "Playing"
    } else if snapshot.cursor >= snapshot.duration {
        "Ended"
    } else {
        "Paused"
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {:<8}", play_symbol, play_state_str),
            Style::default().fg(if snapshot.playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("{:>7.3}s / {:.3}s  ", snapshot.cursor, snapshot.duration),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:>5.1}%  ", snapshot.progress() * 100.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Speed: {}x", snapshot.speed),
            Style::default().fg(Color::Cyan),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
