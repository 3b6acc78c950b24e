//! Application model: what the terminal front-end shows.
//!
//! The `App` struct is only ever mutated from the event loop thread, by
//! applying controller notifications and the results of key presses.

use crate::player::{ArtworkRef, Notification};

/// Consumer-side mirror of the player, built from notifications.
#[derive(Debug, Clone)]
pub struct App {
    pub dir: String,
    pub playlist_len: usize,
    pub index: Option<usize>,
    pub playing: bool,
    /// `(current_ms, duration_ms)` from the last position notification.
    pub position: Option<(u64, u64)>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub artwork: Option<ArtworkRef>,
    pub muted: bool,
    pub volume: u8,
    ended: bool,
}

impl App {
    pub fn new(dir: String, playlist_len: usize) -> Self {
        Self {
            dir,
            playlist_len,
            index: None,
            playing: false,
            position: None,
            title: None,
            artist: None,
            artwork: None,
            muted: false,
            volume: 0,
            ended: false,
        }
    }

    /// Fold one notification into the model.
    pub fn apply(&mut self, n: Notification) {
        match n {
            Notification::StateChanged(playing) => self.playing = playing,
            Notification::PositionChanged {
                current_ms,
                duration_ms,
            } => self.position = Some((current_ms.min(duration_ms), duration_ms)),
            Notification::AlbumArtChanged(art) => self.artwork = art,
            Notification::TrackInfoChanged { title, artist } => {
                self.title = Some(title);
                self.artist = artist;
            }
            Notification::MuteChanged(muted) => self.muted = muted,
            Notification::EndReached => {
                self.playing = false;
                self.ended = true;
            }
        }
    }

    /// Return and clear the "track ended" flag.
    pub fn take_ended(&mut self) -> bool {
        std::mem::take(&mut self.ended)
    }

    /// Forget everything tied to the previous track.
    pub fn track_changed(&mut self, index: Option<usize>) {
        self.index = index;
        self.position = None;
        self.title = None;
        self.artist = None;
        self.artwork = None;
    }

    pub fn has_tracks(&self) -> bool {
        self.playlist_len > 0
    }

    /// Played fraction of the current track, 0.0 while unknown.
    pub fn progress(&self) -> f64 {
        match self.position {
            Some((cur, dur)) if dur > 0 => (cur as f64 / dur as f64).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// `MM:SS / MM:SS`, or dashes while the duration is unknown.
    pub fn time_text(&self) -> String {
        match self.position {
            Some((cur, dur)) => format!("{} / {}", format_mmss(cur), format_mmss(dur)),
            None => "--:-- / --:--".to_string(),
        }
    }

    /// `i/N`, 1-based.
    pub fn position_in_playlist(&self) -> String {
        match self.index {
            Some(i) => format!("{}/{}", i + 1, self.playlist_len),
            None => format!("-/{}", self.playlist_len),
        }
    }

    /// Short human description of the current artwork.
    pub fn artwork_text(&self) -> String {
        match &self.artwork {
            Some(ArtworkRef::Embedded(art)) => {
                format!("{} ({} KiB)", art.mime_type, art.data.len().div_ceil(1024))
            }
            Some(ArtworkRef::Remote(url)) => url.clone(),
            None => "none".to_string(),
        }
    }
}

/// Format milliseconds as `MM:SS` (minutes keep growing past 59).
pub fn format_mmss(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
