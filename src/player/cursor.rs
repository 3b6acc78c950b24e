use crate::library::Track;

/// Ordered, fixed playlist plus the index of the current track.
///
/// The index is `Some` exactly when the playlist is non-empty; moving it wraps
/// around in both directions.
#[derive(Debug, Clone, Default)]
pub struct PlaylistCursor {
    tracks: Vec<Track>,
    index: Option<usize>,
}

impl PlaylistCursor {
    pub fn new(tracks: Vec<Track>) -> Self {
        let index = if tracks.is_empty() { None } else { Some(0) };
        Self { tracks, index }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&Track> {
        self.index.and_then(|i| self.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Step forward, wrapping to the first track. Returns the new index.
    pub fn advance(&mut self) -> Option<usize> {
        let len = self.tracks.len();
        self.index = self.index.map(|i| (i + 1) % len);
        self.index
    }

    /// Step back, wrapping to the last track. Returns the new index.
    pub fn retreat(&mut self) -> Option<usize> {
        let len = self.tracks.len();
        self.index = self.index.map(|i| (i + len - 1) % len);
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cursor(n: usize) -> PlaylistCursor {
        PlaylistCursor::new((0..n).map(|i| Track::new(format!("/m/{i}.mp3"))).collect())
    }

    #[test]
    fn empty_playlist_has_no_index_and_never_moves() {
        let mut c = cursor(0);
        assert_eq!(c.index(), None);
        assert_eq!(c.advance(), None);
        assert_eq!(c.retreat(), None);
        assert!(c.current().is_none());
    }

    #[test]
    fn two_tracks_wrap_both_ways() {
        let mut c = cursor(2);
        assert_eq!(c.index(), Some(0));
        assert_eq!(c.advance(), Some(1));
        assert_eq!(c.advance(), Some(0));
        assert_eq!(c.retreat(), Some(1));
        assert_eq!(c.current().unwrap().file_name(), "1.mp3");
    }

    #[test]
    fn single_track_stays_put() {
        let mut c = cursor(1);
        assert_eq!(c.advance(), Some(0));
        assert_eq!(c.retreat(), Some(0));
    }

    proptest! {
        #[test]
        fn advancing_len_times_returns_to_start(n in 1usize..64, start in 0usize..64) {
            let mut c = cursor(n);
            for _ in 0..(start % n) {
                c.advance();
            }
            let origin = c.index();
            for _ in 0..n {
                c.advance();
            }
            prop_assert_eq!(c.index(), origin);
        }

        #[test]
        fn retreat_then_advance_is_identity(n in 1usize..64, start in 0usize..64, back_first in any::<bool>()) {
            let mut c = cursor(n);
            for _ in 0..(start % n) {
                c.advance();
            }
            let origin = c.index();
            if back_first {
                c.retreat();
                c.advance();
            } else {
                c.advance();
                c.retreat();
            }
            prop_assert_eq!(c.index(), origin);
        }

        #[test]
        fn index_always_in_bounds(n in 1usize..32, steps in proptest::collection::vec(any::<bool>(), 0..100)) {
            let mut c = cursor(n);
            for forward in steps {
                let i = if forward { c.advance() } else { c.retreat() };
                prop_assert!(i.is_some_and(|i| i < n));
            }
        }
    }
}
