use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use sha2::{Digest, Sha256};
use log;

use crate::classifier::CategoryEncoder;

pub const MODEL_FILE: &str = "risk_model.onnx";
pub const ENCODERS_FILE: &str = "encoders.json";
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
pub const CHECKSUMS_FILE: &str = "checksums.json";

/// Errors raised while loading or validating the trained artifacts.
///
/// All of these are fatal at startup: the server never begins serving with a
/// partially loaded store.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Model error: {0}")]
    Model(String),
}

impl From<ort::Error> for ArtifactError {
    fn from(err: ort::Error) -> Self {
        ArtifactError::Model(err.to_string())
    }
}

/// Locates and reads the artifact files in one model directory.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    model_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new<P: AsRef<Path>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.as_ref().to_path_buf(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn get_model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE)
    }

    pub fn get_encoders_path(&self) -> PathBuf {
        self.model_dir.join(ENCODERS_FILE)
    }

    pub fn get_feature_columns_path(&self) -> PathBuf {
        self.model_dir.join(FEATURE_COLUMNS_FILE)
    }

    pub fn get_checksums_path(&self) -> PathBuf {
        self.model_dir.join(CHECKSUMS_FILE)
    }

    /// SHA-256 of a file as lowercase hex
    pub fn file_digest(path: &Path) -> Result<String, ArtifactError> {
        let bytes = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Checks every file listed in `checksums.json` against its recorded digest.
    ///
    /// Returns the number of files verified; zero when no checksum file exists.
    pub fn verify(&self) -> Result<usize, ArtifactError> {
        let checksums_path = self.get_checksums_path();
        if !checksums_path.exists() {
            log::info!("No {} in {:?}, skipping integrity check", CHECKSUMS_FILE, self.model_dir);
            return Ok(0);
        }

        let expected: HashMap<String, String> = read_json(&checksums_path)?;
        let mut names: Vec<_> = expected.keys().collect();
        names.sort();

        for name in &names {
            let path = self.model_dir.join(name);
            if !path.exists() {
                return Err(ArtifactError::NotFound(path));
            }
            let actual = Self::file_digest(&path)?;
            let wanted = expected[*name].to_lowercase();
            if actual != wanted {
                log::error!("{} hash mismatch: expected {}, got {}", name, wanted, actual);
                return Err(ArtifactError::HashMismatch {
                    file: name.to_string(),
                    expected: wanted,
                    actual,
                });
            }
            log::info!("Verified {} ({})", name, actual);
        }
        Ok(names.len())
    }

    /// Reads the fitted encoders, keyed by feature name.
    pub fn load_encoders(&self) -> Result<HashMap<String, CategoryEncoder>, ArtifactError> {
        let path = self.get_encoders_path();
        let raw: HashMap<String, Vec<String>> = read_json(&path)?;
        let mut encoders = HashMap::with_capacity(raw.len());
        for (feature, classes) in raw {
            let encoder = CategoryEncoder::from_classes(classes).map_err(|duplicate| {
                ArtifactError::Schema(format!(
                    "encoder for '{}' lists category {:?} more than once",
                    feature, duplicate
                ))
            })?;
            log::info!("  encoder '{}': {} categories", feature, encoder.len());
            encoders.insert(feature, encoder);
        }
        Ok(encoders)
    }

    /// Reads the ordered feature-column list.
    pub fn load_feature_columns(&self) -> Result<Vec<String>, ArtifactError> {
        read_json(&self.get_feature_columns_path())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Json {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        source,
    })
}
