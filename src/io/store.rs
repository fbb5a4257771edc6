//! Durable storage for the artifact pair.
//!
//! The pipeline reads artifacts through `ArtifactStore` so the storage medium
//! stays swappable (filesystem in production, in-memory or instrumented stores
//! in tests).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "artifacts/model.json";
pub const DEFAULT_PREPROCESSOR_PATH: &str = "artifacts/preprocessor.json";

/// Which half of the artifact pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Preprocessor,
}

impl ArtifactKind {
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Preprocessor => "preprocessor",
        }
    }
}

/// Read access to the serialized artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Fetch the raw bytes of one artifact.
    fn read(&self, kind: ArtifactKind) -> io::Result<Vec<u8>>;

    /// Human-readable location used in error messages and logs.
    fn location(&self, kind: ArtifactKind) -> String;
}

/// Artifacts stored as files on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsArtifactStore {
    model_path: PathBuf,
    preprocessor_path: PathBuf,
}

impl FsArtifactStore {
    pub fn new(model_path: impl Into<PathBuf>, preprocessor_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            preprocessor_path: preprocessor_path.into(),
        }
    }

    pub fn path(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Model => &self.model_path,
            ArtifactKind::Preprocessor => &self.preprocessor_path,
        }
    }
}

impl Default for FsArtifactStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH, DEFAULT_PREPROCESSOR_PATH)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn read(&self, kind: ArtifactKind) -> io::Result<Vec<u8>> {
        fs::read(self.path(kind))
    }

    fn location(&self, kind: ArtifactKind) -> String {
        format!("'{}'", self.path(kind).display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_surfaces_io_error() {
        let store = FsArtifactStore::new("does/not/exist/model.json", "does/not/exist/pre.json");
        let err = store.read(ArtifactKind::Model).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(store.location(ArtifactKind::Model), "'does/not/exist/model.json'");
    }

    #[test]
    fn default_points_at_artifacts_dir() {
        let store = FsArtifactStore::default();
        assert_eq!(store.path(ArtifactKind::Preprocessor), Path::new(DEFAULT_PREPROCESSOR_PATH));
    }
}
