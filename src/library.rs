//! Playlist discovery.
//!
//! A playlist is just an ordered list of paths; tags are read later by the
//! metadata provider when a track is actually loaded.

mod model;
mod scan;

pub use model::Track;
pub use scan::scan;
