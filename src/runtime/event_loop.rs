use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use crate::app::App;
use crate::config;
use crate::engine::NativeEngine;
use crate::player::{Notifications, PlaybackController};
use crate::ui;

/// A key press, resolved to what it asks the player to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    PlayPause,
    Next,
    Previous,
    /// Relative seek, in steps of `audio.seek_step` (negative = backwards).
    Seek(i8),
    /// Relative volume change, in steps of `audio.volume_step`.
    Volume(i8),
    ToggleMute,
    Quit,
}

/// Map a key event to an [`Action`]. Unbound keys yield `None`.
pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Action::Quit);
    }
    let action = match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => Action::PlayPause,
        KeyCode::Char('l') | KeyCode::Char('n') => Action::Next,
        KeyCode::Char('h') | KeyCode::Char('b') => Action::Previous,
        KeyCode::Right => Action::Seek(1),
        KeyCode::Left => Action::Seek(-1),
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Volume(1),
        KeyCode::Char('-') => Action::Volume(-1),
        KeyCode::Char('m') => Action::ToggleMute,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Seek target for a relative step from the current progress, in `[0, 1]`.
pub fn seek_target(progress: f64, steps: i8, step: f32) -> f32 {
    (progress as f32 + f32::from(steps) * step).clamp(0.0, 1.0)
}

/// New volume after `steps` presses of `step`, saturating at 0 and 100.
pub fn volume_target(current: u8, steps: i8, step: u8) -> u8 {
    let delta = i16::from(steps) * i16::from(step);
    (i16::from(current) + delta).clamp(0, 100) as u8
}

/// Main terminal loop: drains controller notifications into `app`, redraws,
/// and turns key presses into controller calls. Returns when quit is requested.
pub fn run<E: NativeEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &PlaybackController<E>,
    notifications: &Notifications,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        for n in notifications.drain() {
            app.apply(n);
        }
        if app.take_ended() && settings.playback.auto_advance {
            debug!("track ended, advancing");
            controller.next();
            track_changed(app, controller);
        }
        app.volume = controller.volume();

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let Some(action) = action_for(key) else {
                    continue;
                };
                if apply_action(action, settings, app, controller) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn track_changed<E: NativeEngine>(app: &mut App, controller: &PlaybackController<E>) {
    app.track_changed(controller.current_index());
    if let Some(track) = controller.current_track() {
        info!(index = ?app.index, path = %track.path().display(), "now playing");
    }
}

/// Perform `action`. Returns `true` when the loop should exit.
fn apply_action<E: NativeEngine>(
    action: Action,
    settings: &config::Settings,
    app: &mut App,
    controller: &PlaybackController<E>,
) -> bool {
    match action {
        Action::Quit => return true,
        Action::PlayPause => {
            debug!(playing = controller.is_playing(), "play/pause");
            controller.play_pause();
        }
        Action::Next => {
            controller.next();
            track_changed(app, controller);
        }
        Action::Previous => {
            controller.previous();
            track_changed(app, controller);
        }
        Action::Seek(steps) => {
            controller.seek(seek_target(app.progress(), steps, settings.audio.seek_step));
        }
        Action::Volume(steps) => {
            let level = volume_target(controller.volume(), steps, settings.audio.volume_step);
            controller.set_volume(level);
        }
        Action::ToggleMute => controller.toggle_mute(),
    }
    false
}
