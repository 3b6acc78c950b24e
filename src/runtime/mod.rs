use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::engine::RodioEngine;
use crate::library::scan;
use crate::logging;
use crate::metadata::LoftyProvider;
use crate::player::{ControllerOptions, PlaybackController};

mod event_loop;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();
    let log_file = logging::init(&settings.logging);
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }
    if let Some(path) = log_file {
        info!(path = %path.display(), "logging to file");
    }

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| ".".to_string())
    });

    let tracks = scan(Path::new(&dir), &settings.library);
    info!(dir = %dir, tracks = tracks.len(), "library scanned");

    let engine = Arc::new(RodioEngine::new(Duration::from_millis(settings.audio.tick_ms))?);
    let (controller, notifications) = PlaybackController::new(
        engine,
        LoftyProvider::new(),
        tracks,
        ControllerOptions {
            default_volume: settings.audio.default_volume,
        },
    )?;

    let mut app = App::new(dir, controller.playlist_len());
    app.track_changed(controller.current_index());
    app.volume = controller.volume();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result =
        event_loop::run(&mut terminal, &settings, &mut app, &controller, &notifications);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.shutdown();
    info!("shut down");
    run_result
}
