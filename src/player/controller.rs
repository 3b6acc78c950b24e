use std::io;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::engine::NativeEngine;
use crate::library::Track;
use crate::metadata::MetadataProvider;

use super::bridge::{BridgeMsg, EventBridge, Shared, SharedHandle, lock};
use super::cursor::PlaylistCursor;
use super::notify::{Notifications, TrackInfo};

/// Construction-time knobs for [`PlaybackController`].
#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    /// Volume applied on construction (0-100).
    pub default_volume: u8,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self { default_volume: 70 }
    }
}

/// Owns the engine and the playlist cursor and exposes the transport API.
///
/// Commands are requests: playback state is never assumed after issuing
/// one, it is reported back through [`Notifications`] once the engine
/// confirms it. Every method is a safe no-op on an empty playlist.
pub struct PlaybackController<E: NativeEngine> {
    engine: Arc<E>,
    shared: SharedHandle,
    bridge: EventBridge,
}

impl<E: NativeEngine> PlaybackController<E> {
    /// Subscribe to `engine`, load the first track (without playing it), apply the
    /// default volume and unmute. The first notification is `MuteChanged(false)`.
    pub fn new<P: MetadataProvider>(
        engine: Arc<E>,
        provider: P,
        playlist: Vec<Track>,
        options: ControllerOptions,
    ) -> io::Result<(Self, Notifications)> {
        let shared: SharedHandle = Arc::new(Mutex::new(Shared::new(PlaylistCursor::new(playlist))));
        let (bridge, notifications) =
            EventBridge::spawn(engine.clone(), Arc::new(provider), shared.clone())?;
        engine.subscribe(bridge.event_sink());

        let controller = Self {
            engine,
            shared,
            bridge,
        };
        controller.set_volume(options.default_volume);
        controller.set_mute(false);
        controller.load_current();

        Ok((controller, notifications))
    }

    /// Claim a new media id for the cursor's track and load it. Returns whether
    /// the engine accepted the resource.
    fn load_current(&self) -> bool {
        let (media, track) = {
            let mut sh = lock(&self.shared);
            let Some(track) = sh.cursor.current().cloned() else {
                return false;
            };
            (sh.claim_media(), track)
        };

        match self.engine.load_media(media, track.path()) {
            Ok(()) => {
                info!(%media, path = %track.path().display(), "track loaded");
                true
            }
            Err(e) => {
                warn!(%media, path = %track.path().display(), error = %e, "failed to load track");
                // The engine will never parse it, so announce the bare file name now.
                self.bridge.post(BridgeMsg::Metadata {
                    media,
                    info: TrackInfo {
                        title: track.file_name(),
                        artist: None,
                        artwork: None,
                    },
                });
                false
            }
        }
    }

    fn change_track(&self, step: fn(&mut PlaylistCursor) -> Option<usize>) {
        {
            let mut sh = lock(&self.shared);
            if step(&mut sh.cursor).is_none() {
                return;
            }
            // Everything the old resource still raises is stale from here on.
            sh.current = None;
        }

        self.engine.stop();
        if self.load_current() {
            self.engine.play();
        }
    }

    pub fn play_pause(&self) {
        if lock(&self.shared).cursor.is_empty() {
            return;
        }
        if self.engine.is_playing() {
            self.engine.pause();
        } else {
            self.engine.play();
        }
    }

    /// Stop, move to the next track (wrapping) and start playing it.
    pub fn next(&self) {
        self.change_track(PlaylistCursor::advance);
    }

    /// Stop, move to the previous track (wrapping) and start playing it.
    pub fn previous(&self) {
        self.change_track(PlaylistCursor::retreat);
    }

    /// Seek to `fraction` of the track. Ignored when the media is not seekable.
    pub fn seek(&self, fraction: f32) {
        if !fraction.is_finite() || lock(&self.shared).cursor.is_empty() {
            return;
        }
        if self.engine.is_seekable() {
            self.engine.set_position(fraction.clamp(0.0, 1.0));
        } else {
            debug!(fraction, "seek ignored: media not seekable");
        }
    }

    pub fn set_volume(&self, level: u8) {
        let level = level.min(100);
        lock(&self.shared).volume = level;
        self.engine.set_volume(level);
    }

    /// Set mute and always announce it, even if nothing changed.
    pub fn set_mute(&self, muted: bool) {
        lock(&self.shared).muted = muted;
        self.engine.set_mute(muted);
        self.bridge.post(BridgeMsg::Mute(muted));
    }

    pub fn toggle_mute(&self) {
        let muted = !self.is_muted();
        self.set_mute(muted);
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    pub fn is_muted(&self) -> bool {
        lock(&self.shared).muted
    }

    pub fn volume(&self) -> u8 {
        lock(&self.shared).volume
    }

    pub fn current_index(&self) -> Option<usize> {
        lock(&self.shared).cursor.index()
    }

    pub fn current_track(&self) -> Option<Track> {
        lock(&self.shared).cursor.current().cloned()
    }

    pub fn playlist_len(&self) -> usize {
        lock(&self.shared).cursor.len()
    }

    /// Consume the controller. The work happens in `Drop`: the engine is
    /// stopped and the event bridge thread is joined before this returns.
    pub fn shutdown(self) {
        info!("controller shutting down");
        drop(self);
    }
}

impl<E: NativeEngine> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        lock(&self.shared).current = None;
        self.engine.stop();
    }
}
