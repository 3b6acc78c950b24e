//! Embedded metadata extraction.
//!
//! The controller asks a [`MetadataProvider`] for artwork and title/artist
//! each time a resource finishes parsing. Providers may fail; callers treat
//! failure as "nothing found".

mod tags;

use std::path::Path;
use std::sync::Arc;

use crate::error::MetadataError;

pub use tags::LoftyProvider;

/// Embedded cover art.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// What a provider could extract from a file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub artwork: Option<Artwork>,
    pub title: Option<String>,
    pub artist: Option<String>,
}

pub trait MetadataProvider: Send + Sync + 'static {
    fn extract(&self, path: &Path) -> Result<TrackMetadata, MetadataError>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for Arc<P> {
    fn extract(&self, path: &Path) -> Result<TrackMetadata, MetadataError> {
        (**self).extract(path)
    }
}

/// Trim and drop blank tag values.
pub(crate) fn non_blank(value: Option<impl AsRef<str>>) -> Option<String> {
    value
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
}
