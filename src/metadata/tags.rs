use std::path::Path;

use lofty::picture::{Picture, PictureType};
use lofty::prelude::*;

use crate::error::MetadataError;

use super::{Artwork, MetadataProvider, TrackMetadata, non_blank};

/// Reads tags and cover art with `lofty`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyProvider;

impl LoftyProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Prefer the front cover, otherwise whatever picture comes first.
fn cover_index(kinds: &[PictureType]) -> Option<usize> {
    kinds
        .iter()
        .position(|k| *k == PictureType::CoverFront)
        .or_else(|| (!kinds.is_empty()).then_some(0))
}

fn pick_artwork(pictures: &[Picture]) -> Option<Artwork> {
    let kinds: Vec<PictureType> = pictures.iter().map(Picture::pic_type).collect();
    cover_index(&kinds)
        .map(|i| &pictures[i])
        .filter(|p| !p.data().is_empty())
        .map(|p| Artwork {
            data: p.data().to_vec(),
            mime_type: p
                .mime_type()
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        })
}

impl MetadataProvider for LoftyProvider {
    fn extract(&self, path: &Path) -> Result<TrackMetadata, MetadataError> {
        if !path.is_file() {
            return Err(MetadataError::Unsupported(path.to_path_buf()));
        }

        let tagged = lofty::read_from_path(path)?;
        let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
            return Ok(TrackMetadata::default());
        };

        Ok(TrackMetadata {
            artwork: pick_artwork(tag.pictures()),
            title: non_blank(tag.title()),
            artist: non_blank(tag.artist()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_index_prefers_front_cover() {
        let kinds = [PictureType::Artist, PictureType::CoverFront];
        assert_eq!(cover_index(&kinds), Some(1));
    }

    #[test]
    fn cover_index_falls_back_to_first_picture() {
        let kinds = [PictureType::Leaflet, PictureType::Artist];
        assert_eq!(cover_index(&kinds), Some(0));
        assert_eq!(cover_index(&[]), None);
    }

    #[test]
    fn missing_file_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let err = LoftyProvider::new()
            .extract(&dir.path().join("gone.mp3"))
            .unwrap_err();
        assert!(matches!(err, MetadataError::Unsupported(_)));
    }

    #[test]
    fn garbage_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(LoftyProvider::new().extract(&path).is_err());
    }
}
