use std::path::{Path, PathBuf};

/// One playable resource in the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The bare file name (extension included), used as a fallback title.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl From<PathBuf> for Track {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}
