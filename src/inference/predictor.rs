//! Predictor - loaded transform + classifier
//!
//! Built once at startup from two JSON artifact blobs and shared
//! read-only with every request.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::classifier::Classifier;
use super::transform::Transform;
use crate::models::layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT};
use crate::models::DeviceFeatures;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("{artifact} artifact is missing: {detail}")]
    Missing { artifact: &'static str, detail: String },

    #[error("failed to read {artifact} artifact: {source}")]
    Io {
        artifact: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{artifact} artifact is corrupt: {source}")]
    Corrupt {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{artifact} artifact is incompatible: {reason}")]
    Incompatible { artifact: &'static str, reason: String },
}

// ============================================================================
// ARTIFACT ENVELOPE
// ============================================================================

/// Fields every artifact may carry next to its model parameters
#[derive(Debug, Deserialize)]
struct Artifact<T> {
    #[serde(flatten)]
    body: T,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    #[serde(default)]
    layout_hash: Option<u32>,
}

impl<T> Artifact<T> {
    fn check_layout(&self) -> Result<(), String> {
        if let Some(names) = &self.feature_names {
            let expected: Vec<&str> = FEATURE_LAYOUT.iter().map(|spec| spec.name).collect();
            if names.len() != FEATURE_COUNT || names.iter().zip(&expected).any(|(a, b)| a != b) {
                return Err(format!(
                    "feature names {:?} do not match layout {:?}",
                    names, expected
                ));
            }
        }

        if let Some(hash) = self.layout_hash {
            let current = layout_hash();
            if hash != current {
                return Err(format!(
                    "layout hash {:08x} does not match current layout {:08x}",
                    hash, current
                ));
            }
        }

        Ok(())
    }
}

fn parse<T: for<'de> Deserialize<'de>>(
    artifact: &'static str,
    blob: &[u8],
) -> Result<Artifact<T>, ArtifactLoadError> {
    if blob.iter().all(u8::is_ascii_whitespace) {
        return Err(ArtifactLoadError::Missing {
            artifact,
            detail: "blob is empty".to_string(),
        });
    }

    let parsed: Artifact<T> = serde_json::from_slice(blob)
        .map_err(|source| ArtifactLoadError::Corrupt { artifact, source })?;

    parsed
        .check_layout()
        .map_err(|reason| ArtifactLoadError::Incompatible { artifact, reason })?;

    Ok(parsed)
}

fn read_blob(artifact: &'static str, path: &Path) -> Result<Vec<u8>, ArtifactLoadError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => ArtifactLoadError::Missing {
            artifact,
            detail: format!("no file at {}", path.display()),
        },
        _ => ArtifactLoadError::Io { artifact, source },
    })
}

// ============================================================================
// PREDICTOR
// ============================================================================

/// Description of the loaded artifacts
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub transform: &'static str,
    pub classifier: &'static str,
    pub classes: Vec<i64>,
    pub feature_count: usize,
    pub layout_hash: String,
    pub transform_sha256: String,
    pub classifier_sha256: String,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Predictor {
    transform: Transform,
    classifier: Classifier,
    info: ModelInfo,
}

impl Predictor {
    /// Deserialize and validate both artifacts
    pub fn load_artifacts(
        transform_blob: &[u8],
        classifier_blob: &[u8],
    ) -> Result<Self, ArtifactLoadError> {
        let transform = parse::<Transform>("transform", transform_blob)?.body;
        transform
            .validate()
            .map_err(|reason| ArtifactLoadError::Incompatible { artifact: "transform", reason })?;

        let classifier = parse::<Classifier>("classifier", classifier_blob)?.body;
        classifier
            .validate()
            .map_err(|reason| ArtifactLoadError::Incompatible { artifact: "classifier", reason })?;

        let info = ModelInfo {
            transform: transform.kind(),
            classifier: classifier.kind(),
            classes: classifier.classes().to_vec(),
            feature_count: FEATURE_COUNT,
            layout_hash: format!("{:08x}", layout_hash()),
            transform_sha256: format!("{:x}", Sha256::digest(transform_blob)),
            classifier_sha256: format!("{:x}", Sha256::digest(classifier_blob)),
            loaded_at: Utc::now(),
        };

        tracing::info!(
            transform = info.transform,
            classifier = info.classifier,
            classes = ?info.classes,
            transform_sha256 = %info.transform_sha256,
            classifier_sha256 = %info.classifier_sha256,
            "Model artifacts loaded"
        );

        Ok(Self { transform, classifier, info })
    }

    /// Read both artifact files then load them
    pub fn from_files(
        transform_path: &Path,
        classifier_path: &Path,
    ) -> Result<Self, ArtifactLoadError> {
        let transform_blob = read_blob("transform", transform_path)?;
        let classifier_blob = read_blob("classifier", classifier_path)?;
        Self::load_artifacts(&transform_blob, &classifier_blob)
    }

    /// Price-range label for one device
    pub fn predict(&self, features: &DeviceFeatures) -> i64 {
        let transformed = self.transform.apply(&features.to_vector());
        self.classifier.predict(&transformed)
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}
