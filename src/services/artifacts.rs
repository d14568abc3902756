use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::presets::ModelResolver;

#[derive(Debug, Error, PartialEq)]
pub enum ArtifactError {
    #[error("Unsupported model reference scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Model artifact not found: {0}")]
    NotFound(String),

    #[error("Empty model reference")]
    Empty,
}

/// Resolves model refs to files on local storage
///
/// Accepts plain paths and `file://` URIs. Relative paths are taken from
/// `artifact_dir` when one is configured. Remote schemes (`gs://`, `s3://`,
/// `https://`) are left to an external fetcher and rejected here.
#[derive(Debug, Clone, Default)]
pub struct LocalArtifactResolver {
    artifact_dir: Option<PathBuf>,
}

impl LocalArtifactResolver {
    pub fn new(artifact_dir: Option<PathBuf>) -> Self {
        Self { artifact_dir }
    }

    pub fn resolve_path(&self, model_ref: &str) -> Result<PathBuf, ArtifactError> {
        let model_ref = model_ref.trim();
        if model_ref.is_empty() {
            return Err(ArtifactError::Empty);
        }

        let raw = match model_ref.split_once("://") {
            Some(("file", rest)) => rest,
            Some((scheme, _)) => return Err(ArtifactError::UnsupportedScheme(scheme.to_string())),
            None => model_ref,
        };

        let path = Path::new(raw);
        let path = match &self.artifact_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };

        if !path.is_file() {
            return Err(ArtifactError::NotFound(path.display().to_string()));
        }

        tracing::debug!(model_ref = %model_ref, path = %path.display(), "Resolved model artifact");
        Ok(path)
    }
}

impl ModelResolver for LocalArtifactResolver {
    fn resolve(&self, model_ref: &str) -> Result<PathBuf, String> {
        self.resolve_path(model_ref).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_file_uri() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.json");
        std::fs::write(&model, "{}").unwrap();

        let resolver = LocalArtifactResolver::default();
        let plain = model.display().to_string();
        assert_eq!(resolver.resolve_path(&plain).unwrap(), model);
        assert_eq!(resolver.resolve_path(&format!("file://{}", plain)).unwrap(), model);
    }

    #[test]
    fn test_relative_to_artifact_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.json"), "{}").unwrap();

        let resolver = LocalArtifactResolver::new(Some(dir.path().to_path_buf()));
        assert_eq!(resolver.resolve_path("model.json").unwrap(), dir.path().join("model.json"));
    }

    #[test]
    fn test_remote_scheme_rejected() {
        let resolver = LocalArtifactResolver::default();
        assert_eq!(
            resolver.resolve_path("gs://bucket/model.json"),
            Err(ArtifactError::UnsupportedScheme("gs".into()))
        );
    }

    #[test]
    fn test_missing_file() {
        let resolver = LocalArtifactResolver::default();
        assert!(matches!(
            resolver.resolve_path("/definitely/not/here.json"),
            Err(ArtifactError::NotFound(_))
        ));
        assert_eq!(resolver.resolve_path("  "), Err(ArtifactError::Empty));
    }
}
