//! Audio engine abstraction and the default `rodio` implementation.
//!
//! The controller only talks to [`NativeEngine`]. An engine decodes and
//! renders one resource at a time and reports what happened through the
//! [`EventSink`] it was subscribed with, typically from its own threads.

mod player;
mod sink;
mod thread;
mod types;

use std::path::Path;

use crate::error::EngineError;

pub use player::RodioEngine;
pub use types::{EngineEvent, EngineMeta, EventSink, MediaId};

/// Transport primitives of a media engine.
///
/// All methods take `&self`: implementations are shared between the
/// controller and its event dispatcher and must synchronize internally.
pub trait NativeEngine: Send + Sync + 'static {
    /// Register the receiver of engine events. Replaces any previous sink.
    fn subscribe(&self, sink: EventSink);

    /// Replace the loaded resource with `path`. Does not start playback.
    fn load_media(&self, media: MediaId, path: &Path) -> Result<(), EngineError>;

    fn play(&self);
    fn pause(&self);
    fn stop(&self);

    fn is_playing(&self) -> bool;
    fn is_seekable(&self) -> bool;

    /// Seek to `fraction` (0.0..=1.0) of the resource length.
    fn set_position(&self, fraction: f32);

    /// Current playback time in milliseconds.
    fn time_ms(&self) -> u64;
    /// Resource length in milliseconds, 0 while unknown.
    fn length_ms(&self) -> u64;

    fn set_volume(&self, level: u8);
    fn set_mute(&self, muted: bool);

    /// Metadata the engine read itself, if any.
    fn media_meta(&self) -> EngineMeta {
        EngineMeta::default()
    }
}

#[cfg(test)]
mod tests;
