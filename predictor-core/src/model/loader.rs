//! Model Loader - reads a serialized artifact once at startup
//!
//! Every failure here is fatal for the caller: there is no fallback model.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::features::layout::{self, LayoutMismatchError, FEATURE_VERSION};
use super::inference::{ModelFormat, OnnxRegressor, Regressor};
use super::linear::{LinearArtifact, LinearRegressor};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("model artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("model artifact {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("unsupported model artifact {} (expected .onnx or .json)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("model artifact {} was trained on a different feature layout: {source}", path.display())]
    LayoutMismatch {
        path: PathBuf,
        #[source]
        source: LayoutMismatchError,
    },
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// What was loaded, for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub format: ModelFormat,
    pub sha256: String,
    pub size_bytes: u64,
    pub layout_version: u8,
    pub layout_hash: u32,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// A loaded, immutable model plus its metadata
#[derive(Clone)]
pub struct LoadedModel {
    pub regressor: Arc<dyn Regressor>,
    pub metadata: ModelMetadata,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("regressor", &self.regressor.name())
            .field("metadata", &self.metadata)
            .finish()
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Load a model artifact from `path`.
///
/// The format is chosen by extension. If `<path>.sha256` exists, the file
/// digest must match it.
pub fn load_model(path: impl AsRef<Path>) -> Result<LoadedModel, ArtifactLoadError> {
    let path = path.as_ref();
    log::info!("Loading model artifact from: {}", path.display());

    let format = ModelFormat::from_path(path)
        .ok_or_else(|| ArtifactLoadError::UnsupportedFormat { path: path.to_path_buf() })?;

    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ArtifactLoadError::NotFound { path: path.to_path_buf() },
        _ => ArtifactLoadError::Unreadable { path: path.to_path_buf(), source },
    })?;

    let sha256 = hex::encode(Sha256::digest(&bytes));
    verify_checksum(path, &sha256)?;

    let name = path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let corrupt = |reason: String| ArtifactLoadError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let regressor: Arc<dyn Regressor> = match format {
        ModelFormat::Onnx => Arc::new(OnnxRegressor::from_bytes(name, &bytes).map_err(corrupt)?),
        ModelFormat::Linear => {
            let artifact: LinearArtifact = serde_json::from_slice(&bytes)
                .map_err(|e| corrupt(e.to_string()))?;

            if let Some(names) = &artifact.feature_names {
                layout::validate_declared_names(names)
                    .map_err(|source| ArtifactLoadError::LayoutMismatch {
                        path: path.to_path_buf(),
                        source,
                    })?;
            }

            Arc::new(LinearRegressor::from_artifact(name, artifact).map_err(corrupt)?)
        }
    };

    let metadata = ModelMetadata {
        model_path: path.display().to_string(),
        format,
        sha256,
        size_bytes: bytes.len() as u64,
        layout_version: FEATURE_VERSION,
        layout_hash: layout::layout_hash(),
        loaded_at: chrono::Utc::now(),
    };

    log::info!(
        "Model loaded: {} ({}, {} bytes, sha256 {})",
        metadata.model_path,
        format.as_str(),
        metadata.size_bytes,
        &metadata.sha256[..12]
    );

    Ok(LoadedModel { regressor, metadata })
}

/// Path of the optional digest file next to an artifact
pub fn checksum_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

/// Compare against `<path>.sha256` when it exists.
///
/// The sidecar may be a bare digest or `sha256sum` output (`<digest>  <file>`).
fn verify_checksum(path: &Path, actual: &str) -> Result<(), ArtifactLoadError> {
    let sidecar = checksum_path(path);

    let contents = match fs::read_to_string(&sidecar) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("No checksum file at {}", sidecar.display());
            return Ok(());
        }
        Err(source) => return Err(ArtifactLoadError::Unreadable { path: sidecar, source }),
    };

    let expected = contents.split_whitespace().next().unwrap_or("").to_ascii_lowercase();

    if expected != actual {
        return Err(ArtifactLoadError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("checksum mismatch: expected {}, got {}", expected, actual),
        });
    }

    log::debug!("Checksum verified for {}", path.display());
    Ok(())
}
