use super::*;
use crate::metadata::Artwork;
use crate::player::{ArtworkRef, Notification};
use std::sync::Arc;

fn app() -> App {
    App::new("/music".into(), 3)
}

#[test]
fn format_mmss_pads_and_rolls_minutes() {
    assert_eq!(format_mmss(0), "00:00");
    assert_eq!(format_mmss(61_999), "01:01");
    assert_eq!(format_mmss(3_600_000), "60:00");
}

#[test]
fn apply_tracks_state_position_and_mute() {
    let mut a = app();
    a.apply(Notification::StateChanged(true));
    a.apply(Notification::PositionChanged {
        current_ms: 30_000,
        duration_ms: 120_000,
    });
    a.apply(Notification::MuteChanged(true));

    assert!(a.playing);
    assert!(a.muted);
    assert_eq!(a.time_text(), "00:30 / 02:00");
    assert!((a.progress() - 0.25).abs() < 1e-9);

    a.apply(Notification::StateChanged(false));
    assert!(!a.playing);
}

#[test]
fn apply_track_info_and_artwork() {
    let mut a = app();
    a.apply(Notification::TrackInfoChanged {
        title: "Song".into(),
        artist: Some("Band".into()),
    });
    a.apply(Notification::AlbumArtChanged(Some(ArtworkRef::Embedded(
        Arc::new(Artwork {
            data: vec![0; 2048],
            mime_type: "image/png".into(),
        }),
    ))));

    assert_eq!(a.title.as_deref(), Some("Song"));
    assert_eq!(a.artist.as_deref(), Some("Band"));
    assert_eq!(a.artwork_text(), "image/png (2 KiB)");

    a.apply(Notification::AlbumArtChanged(Some(ArtworkRef::Remote(
        "https://example.com/a.jpg".into(),
    ))));
    assert_eq!(a.artwork_text(), "https://example.com/a.jpg");
}

#[test]
fn end_reached_sets_a_one_shot_flag() {
    let mut a = app();
    a.apply(Notification::StateChanged(true));
    a.apply(Notification::EndReached);

    assert!(!a.playing);
    assert!(a.take_ended());
    assert!(!a.take_ended());
}

#[test]
fn track_changed_clears_per_track_state() {
    let mut a = app();
    a.apply(Notification::TrackInfoChanged {
        title: "Old".into(),
        artist: None,
    });
    a.apply(Notification::PositionChanged {
        current_ms: 1,
        duration_ms: 2,
    });

    a.track_changed(Some(2));
    assert_eq!(a.index, Some(2));
    assert!(a.title.is_none());
    assert!(a.position.is_none());
    assert_eq!(a.position_in_playlist(), "3/3");
    assert_eq!(a.time_text(), "--:-- / --:--");
    assert_eq!(a.artwork_text(), "none");
}

#[test]
fn progress_is_zero_while_unknown_and_clamped() {
    let mut a = app();
    assert_eq!(a.progress(), 0.0);
    a.apply(Notification::PositionChanged {
        current_ms: 5_000,
        duration_ms: 4_000,
    });
    assert_eq!(a.progress(), 1.0);
}

#[test]
fn empty_playlist_position_text() {
    let a = App::new(".".into(), 0);
    assert!(!a.has_tracks());
    assert_eq!(a.position_in_playlist(), "-/0");
}
