//! File logging.
//!
//! The terminal is owned by the TUI, so log output goes to a file instead of
//! stderr. `RUST_LOG` overrides the configured level.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{LoggingSettings, default_log_path};

/// Install the global subscriber. Returns the file being written to, if any.
///
/// Never fails: when the log file cannot be opened, events are discarded.
pub fn init(settings: &LoggingSettings) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let path = settings.file.clone().or_else(default_log_path);
    let (writer, opened) = match path.as_deref().map(open_log_file) {
        Some(Ok(file)) => (BoxMakeWriter::new(Mutex::new(file)), path),
        _ => (BoxMakeWriter::new(io::sink), None),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init();

    opened
}

/// Open `path` for appending, creating parent directories as needed.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
