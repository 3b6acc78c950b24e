//! Notifications delivered to the single consumer of a controller.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
#[cfg(test)]
use std::time::{Duration, Instant};

use crate::engine::MediaId;
use crate::metadata::Artwork;

use super::bridge::{SharedHandle, lock};

/// Where the current track's cover art can be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkRef {
    /// Picture embedded in the file's tags.
    Embedded(Arc<Artwork>),
    /// Location reported by the engine (e.g. a remote URL).
    Remote(String),
}

/// Title/artist/art resolved for a freshly parsed resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: String,
    pub artist: Option<String>,
    pub artwork: Option<ArtworkRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// `true` while the engine reports playing; paused and stopped both map to `false`.
    StateChanged(bool),
    /// Never sent while the duration is unknown (0).
    PositionChanged { current_ms: u64, duration_ms: u64 },
    AlbumArtChanged(Option<ArtworkRef>),
    TrackInfoChanged {
        title: String,
        artist: Option<String>,
    },
    /// Sent on every mute command, even when the value did not change.
    MuteChanged(bool),
    /// The current track played to its end. Advancing is up to the consumer.
    EndReached,
}

/// A notification as it travels from the dispatcher to the consumer.
///
/// `media` is the resource it describes. Controller-level news such as mute
/// changes carries `None` and is always delivered.
#[derive(Debug)]
pub(super) struct Tagged {
    pub media: Option<MediaId>,
    pub notification: Notification,
}

/// Receiving end of a controller's notification stream.
///
/// There is exactly one per controller; it is not `Clone` and not `Sync`, so
/// notifications are only ever handled from the thread that drains it.
/// Anything queued for a resource that has since been replaced is dropped on
/// receipt, so a track change also discards what was already in flight.
#[derive(Debug)]
pub struct Notifications {
    rx: Receiver<Tagged>,
    shared: SharedHandle,
}

impl Notifications {
    pub(super) fn new(rx: Receiver<Tagged>, shared: SharedHandle) -> Self {
        Self { rx, shared }
    }

    fn accept(&self, tagged: Tagged) -> Option<Notification> {
        match tagged.media {
            Some(media) if lock(&self.shared).current != Some(media) => None,
            _ => Some(tagged.notification),
        }
    }

    /// Next pending notification, without blocking.
    pub fn try_next(&self) -> Option<Notification> {
        loop {
            let tagged = self.rx.try_recv().ok()?;
            if let Some(n) = self.accept(tagged) {
                return Some(n);
            }
        }
    }

    /// Wait up to `timeout` for the next notification.
    ///
    /// Returns `None` on timeout or once the controller has shut down.
    #[cfg(test)]
    pub fn next_timeout(&self, timeout: Duration) -> Option<Notification> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            let tagged = self.rx.recv_timeout(left).ok()?;
            if let Some(n) = self.accept(tagged) {
                return Some(n);
            }
        }
    }

    /// Everything currently queued, in delivery order.
    pub fn drain(&self) -> impl Iterator<Item = Notification> + '_ {
        std::iter::from_fn(|| self.try_next())
    }
}
