//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::app::App;

const CONTROLS: [(&str, &str); 6] = [
    ("space/p", "play/pause"),
    ("h/l", "prev/next"),
    ("←/→", "seek"),
    ("+/-", "volume"),
    ("m", "mute"),
    ("q", "quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{}] {}", k, v))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// One-line status: play state, volume, playlist position and directory.
fn status_text(app: &App) -> String {
    let state = if !app.has_tracks() {
        "No tracks"
    } else if app.playing {
        "Playing"
    } else {
        "Paused"
    };
    let volume = if app.muted {
        format!("Volume: {} (muted)", app.volume)
    } else {
        format!("Volume: {}", app.volume)
    };
    [
        state.to_string(),
        volume,
        format!("Track: {}", app.position_in_playlist()),
        format!("Dir: {}", app.dir),
    ]
    .join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let now_playing = format!(
        "Title: {}\nArtist: {}\nArtwork: {}",
        app.title.as_deref().unwrap_or("-"),
        app.artist.as_deref().unwrap_or("-"),
        app.artwork_text(),
    );
    let now_playing = Paragraph::new(now_playing)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding::horizontal(1))
                .title(" tonearm ")
                .title_alignment(Alignment::Center),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, chunks[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" position "))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(app.progress())
        .label(app.time_text());
    frame.render_widget(gauge, chunks[1]);

    let status = Paragraph::new(status_text(app))
        .block(Block::bordered().padding(Padding::horizontal(1)).title(" status "));
    frame.render_widget(status, chunks[2]);

    let footer = Paragraph::new(controls_text())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" controls "));
    frame.render_widget(footer, chunks[4]);
}
