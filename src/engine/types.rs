//! Engine-facing small types: media identity, raw events and the event sink.

use std::fmt;
use std::sync::Arc;

/// Load generation of one media resource.
///
/// A fresh id is handed to the engine every time a track is loaded, including
/// reloads of the same path. Every engine event carries the id of the resource
/// it refers to so that late events for a replaced resource can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(u64);

impl MediaId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.get())
    }
}

/// Raw events raised by an engine, usually from one of its own threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Playing,
    Paused,
    Stopped,
    TimeChanged,
    LengthChanged,
    EndReached,
    /// The loaded resource's container metadata is readable.
    MediaParsed,
}

/// Metadata the engine itself extracted while parsing the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineMeta {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub artwork_url: Option<String>,
}

/// Callback handle through which an engine reports events.
///
/// Cheap to clone and safe to call from any thread.
#[derive(Clone)]
pub struct EventSink {
    emit: Arc<dyn Fn(MediaId, EngineEvent) + Send + Sync>,
}

impl EventSink {
    pub fn new(emit: impl Fn(MediaId, EngineEvent) + Send + Sync + 'static) -> Self {
        Self {
            emit: Arc::new(emit),
        }
    }

    pub fn emit(&self, media: MediaId, event: EngineEvent) {
        (self.emit)(media, event)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}
