//! Helpers for turning a path into a paused `rodio` sink.
//!
//! Opening and decoding happen on the caller's thread so that an unreadable
//! file is reported synchronously from `load_media`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, Sink, Source};

use crate::error::EngineError;

pub(super) type FileSource = Decoder<BufReader<File>>;

/// Open and decode `path`. Returns the source and its length when the decoder knows it.
pub(super) fn open_source(path: &Path) -> Result<(FileSource, Option<Duration>), EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let length = decoder.total_duration().filter(|d| !d.is_zero());
    Ok((decoder, length))
}

/// Queue `source` on a fresh sink and leave it paused at the start.
pub(super) fn prime_sink(sink: &Sink, source: FileSource, volume: f32) {
    sink.pause();
    sink.set_volume(volume);
    sink.append(source);
}

/// Sink gain for a 0-100 volume level; muting keeps the level but silences output.
pub(super) fn effective_volume(level: u8, muted: bool) -> f32 {
    if muted {
        0.0
    } else {
        f32::from(level.min(100)) / 100.0
    }
}
