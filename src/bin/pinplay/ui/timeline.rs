//! Timeline widget - shows per-pin on-intervals with playhead

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use pin_replay::{PlaybackSnapshot, ProjectedState};

use super::UiStateInit;

/// Render one row per used pin plus a playhead row
pub fn render_timeline(
    frame: &mut Frame,
    area: Rect,
    static_state: &UiStateInit,
    snapshot: &PlaybackSnapshot,
    projection: &ProjectedState,
) {
    if area.height < 2 || area.width < 20 {
        return;
    }

    let label_width = 8u16;
    let timeline_width = area.width.saturating_sub(label_width + 2);
    let seconds_per_char = static_state.duration / timeline_width.max(1) as f64;

    let playhead_char = ((snapshot.progress() * timeline_width as f64) as u16)
        .min(timeline_width.saturating_sub(1));

    let mut lines = Vec::new();

    // Second markers, one every ~10 columns
    let mut markers = " ".repeat(label_width as usize);
    let mut col = 0u16;
    while col < timeline_width {
        let mark = format!("|{:.1}", col as f64 * seconds_per_char);
        let width = (mark.chars().count() as u16).max(10).min(timeline_width - col);
        markers.push_str(&format!("{:<width$.width$}", mark, width = width as usize));
        col += width;
    }
    lines.push(Line::from(Span::styled(
        markers,
        Style::default().fg(Color::DarkGray),
    )));

    for (channel, spans) in &static_state.activity {
        let active = projection.is_on(*channel);
        let color = if active { Color::Cyan } else { Color::DarkGray };

        let mut row = String::with_capacity(timeline_width as usize);
        for c in 0..timeline_width {
            let t = (c as f64 + 0.5) * seconds_per_char;
            let on = spans.iter().any(|(start, end)| t >= *start && t < *end);
            row.push(if on { '▓' } else { '░' });
        }

        lines.push(Line::from(vec![
            Span::styled(
                format!("GPIO{:<3} ", channel),
                Style::default().fg(if active { Color::White } else { Color::DarkGray }),
            ),
            Span::styled(row, Style::default().fg(color)),
        ]));
    }

    let mut playhead = " ".repeat(label_width as usize);
    playhead.push_str(&" ".repeat(playhead_char as usize));
    playhead.push('▲');
    lines.push(Line::from(Span::styled(
        playhead,
        Style::default().fg(Color::Yellow),
    )));

    frame.render_widget(Paragraph::new(lines), area);
}
