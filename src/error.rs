//! Error types shared by the engine and metadata layers.
//!
//! None of these are fatal to the player: the controller logs them and keeps
//! accepting transport commands.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a [`NativeEngine`](crate::engine::NativeEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// No audio output device could be opened.
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),

    /// The media file could not be opened.
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The media file was opened but could not be decoded.
    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// The engine's output thread has exited.
    #[error("audio engine thread is gone")]
    Disconnected,
}

/// Failures raised by a [`MetadataProvider`](crate::metadata::MetadataProvider).
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read tags: {0}")]
    Read(#[from] lofty::error::LoftyError),

    #[error("unsupported file {0:?}")]
    Unsupported(PathBuf),
}
