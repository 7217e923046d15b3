//! Load-once holder for the fitted artifacts of one service instance.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{Metadata, ModelArtifact, TransformArtifact};
use crate::error::ArtifactLoadError;
use crate::metrics;

/// Where the artifacts live, plus optional pinned SHA-256 digests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactLocations {
    pub model: PathBuf,
    #[serde(default)]
    pub transform: Option<PathBuf>,
    #[serde(default)]
    pub metadata: Option<PathBuf>,
    #[serde(default)]
    pub model_sha256: Option<String>,
    #[serde(default)]
    pub transform_sha256: Option<String>,
    #[serde(default)]
    pub metadata_sha256: Option<String>,
}

impl ArtifactLocations {
    pub fn new(model: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            transform: None,
            metadata: None,
            model_sha256: None,
            transform_sha256: None,
            metadata_sha256: None,
        }
    }

    pub fn with_transform(mut self, path: impl Into<PathBuf>) -> Self {
        self.transform = Some(path.into());
        self
    }

    pub fn with_metadata(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata = Some(path.into());
        self
    }
}

/// Hex SHA-256 of every file that was loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactDigests {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

#[derive(Debug)]
pub struct ArtifactStore {
    model: ModelArtifact,
    transform: Option<TransformArtifact>,
    metadata: Metadata,
    digests: ArtifactDigests,
    loaded_at: DateTime<Utc>,
}

impl ArtifactStore {
    pub fn load(locations: &ArtifactLocations) -> Result<Self, ArtifactLoadError> {
        let result = Self::load_inner(locations);
        metrics::record_artifact_load(result.is_ok());
        match &result {
            Ok(store) => info!(
                model = %locations.model.display(),
                kind = store.model.kind(),
                digest = %store.digests.model,
                transform = store.transform.as_ref().map(|t| t.kind()),
                metadata_keys = store.metadata.len(),
                "artifacts loaded"
            ),
            Err(e) => warn!(error = %e, "artifact load failed"),
        }
        result
    }

    fn load_inner(locations: &ArtifactLocations) -> Result<Self, ArtifactLoadError> {
        let (model, model_digest) = read_json::<ModelArtifact>("model", &locations.model, locations.model_sha256.as_deref())?;

        let (transform, transform_digest) = match &locations.transform {
            Some(path) => {
                let (t, d) = read_json::<TransformArtifact>("transform", path, locations.transform_sha256.as_deref())?;
                (Some(t), Some(d))
            }
            None => (None, None),
        };

        let (metadata, metadata_digest) = match &locations.metadata {
            Some(path) => {
                let (m, d) = read_json::<Metadata>("metadata", path, locations.metadata_sha256.as_deref())?;
                (m, Some(d))
            }
            None => (Metadata::new(), None),
        };

        let mut store = Self::from_parts(model, transform, metadata)?;
        store.digests = ArtifactDigests { model: model_digest, transform: transform_digest, metadata: metadata_digest };
        Ok(store)
    }

    /// Assemble a store from already deserialized artifacts, applying the same
    /// structural checks as [`ArtifactStore::load`].
    pub fn from_parts(
        model: ModelArtifact,
        transform: Option<TransformArtifact>,
        metadata: Metadata,
    ) -> Result<Self, ArtifactLoadError> {
        model.validate().map_err(|reason| ArtifactLoadError::Invalid { artifact: "model", reason })?;
        if let Some(t) = &transform {
            t.validate().map_err(|reason| ArtifactLoadError::Invalid { artifact: "transform", reason })?;
            if t.feature_names() != model.feature_names() {
                return Err(ArtifactLoadError::SchemaMismatch {
                    artifact: "transform",
                    expected: model.feature_names().to_vec(),
                    found: t.feature_names().to_vec(),
                });
            }
        }
        Ok(Self {
            model,
            transform,
            metadata,
            digests: ArtifactDigests { model: String::new(), transform: None, metadata: None },
            loaded_at: Utc::now(),
        })
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    pub fn transform(&self) -> Option<&TransformArtifact> {
        self.transform.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn digests(&self) -> &ArtifactDigests {
        &self.digests
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn read_json<T: DeserializeOwned>(
    artifact: &'static str,
    path: &Path,
    pinned: Option<&str>,
) -> Result<(T, String), ArtifactLoadError> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => ArtifactLoadError::Missing { artifact, path: path.to_path_buf() },
        _ => ArtifactLoadError::Io { artifact, path: path.to_path_buf(), source },
    })?;

    let digest = hex::encode(Sha256::digest(&bytes));
    if let Some(expected) = pinned.map(str::trim).filter(|e| !e.is_empty()) {
        if !expected.eq_ignore_ascii_case(&digest) {
            return Err(ArtifactLoadError::DigestMismatch { artifact, expected: expected.to_string(), actual: digest });
        }
    }

    let value = serde_json::from_slice(&bytes)
        .map_err(|source| ArtifactLoadError::Malformed { artifact, path: path.to_path_buf(), source })?;
    Ok((value, digest))
}
