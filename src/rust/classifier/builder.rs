use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use log::{error, info};

use super::encoder::CategoryEncoder;
use super::features::{field_spec, FieldKind};
use super::model::{OnnxRiskModel, RiskModel};
use super::store::ArtifactStore;
use crate::artifacts::{ArtifactError, ArtifactManager};
use crate::runtime::RuntimeConfig;

/// A builder for constructing an [`ArtifactStore`] with a fluent interface.
///
/// Artifacts come either from a model directory ([`with_model_dir`]) or are
/// supplied one by one, which is how tests plug in a stand-in model.
///
/// [`with_model_dir`]: ArtifactStoreBuilder::with_model_dir
#[derive(Default, Debug)]
pub struct ArtifactStoreBuilder {
    model: Option<Arc<dyn RiskModel>>,
    encoders: Option<HashMap<String, CategoryEncoder>>,
    feature_columns: Option<Vec<String>>,
    source: Option<String>,
    runtime_config: RuntimeConfig,
}

impl ArtifactStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ONNX Runtime configuration used by [`with_model_dir`](Self::with_model_dir).
    /// Must be called before it to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Loads every artifact from `dir`.
    ///
    /// # Returns
    /// * `Result<Self, ArtifactError>` - The builder instance if successful, or an error if:
    ///   - Artifacts were already set
    ///   - A listed checksum does not match
    ///   - Any artifact file is missing or malformed
    ///   - The model fails to load
    pub fn with_model_dir(mut self, dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        if self.model.is_some() || self.encoders.is_some() || self.feature_columns.is_some() {
            return Err(ArtifactError::Schema("Artifacts already set".to_string()));
        }

        let manager = ArtifactManager::new(dir);
        info!("Loading artifacts from {:?}", manager.model_dir());
        let verified = manager.verify()?;
        if verified > 0 {
            info!("{} artifact(s) passed integrity check", verified);
        }

        let feature_columns = manager.load_feature_columns()?;
        info!("Loaded {} feature columns", feature_columns.len());
        let encoders = manager.load_encoders()?;
        info!("Loaded {} encoders", encoders.len());
        let model = OnnxRiskModel::load(&manager.get_model_path(), &self.runtime_config)
            .map_err(|e| {
                error!("Failed to load risk model: {}", e);
                e
            })?;

        self.model = Some(Arc::new(model));
        self.encoders = Some(encoders);
        self.feature_columns = Some(feature_columns);
        self.source = Some(manager.model_dir().display().to_string());
        Ok(self)
    }

    pub fn with_model(mut self, model: impl RiskModel + 'static) -> Self {
        self.model = Some(Arc::new(model));
        self
    }

    pub fn with_encoders(mut self, encoders: HashMap<String, CategoryEncoder>) -> Self {
        self.encoders = Some(encoders);
        self
    }

    /// Adds a single encoder, built from its fitted classes
    pub fn add_encoder(
        mut self,
        feature: impl Into<String>,
        classes: Vec<impl Into<String>>,
    ) -> Result<Self, ArtifactError> {
        let feature = feature.into();
        let encoder = CategoryEncoder::from_classes(classes.into_iter().map(Into::into).collect())
            .map_err(|duplicate| {
                ArtifactError::Schema(format!(
                    "encoder for '{}' lists category {:?} more than once",
                    feature, duplicate
                ))
            })?;
        self.encoders.get_or_insert_with(HashMap::new).insert(feature, encoder);
        Ok(self)
    }

    pub fn with_feature_columns(mut self, columns: Vec<impl Into<String>>) -> Self {
        self.feature_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Checks that the column list and encoders agree with the request schema:
    /// - at least one column, none repeated
    /// - every column is a known request field
    /// - categorical columns have an encoder, numeric columns do not
    /// - every encoder feeds a column
    /// - the model input width, when fixed, equals the column count
    fn validate_schema(
        columns: &[String],
        encoders: &HashMap<String, CategoryEncoder>,
        model: &dyn RiskModel,
    ) -> Result<(), ArtifactError> {
        if columns.is_empty() {
            return Err(ArtifactError::Schema("Feature column list is empty".into()));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in columns {
            if !seen.insert(column.as_str()) {
                return Err(ArtifactError::Schema(format!("Column '{}' listed more than once", column)));
            }
            let spec = field_spec(column).ok_or_else(|| {
                ArtifactError::Schema(format!("Column '{}' is not a field of the request form", column))
            })?;
            match (spec.kind, encoders.contains_key(column)) {
                (FieldKind::Categorical, false) => {
                    return Err(ArtifactError::Schema(format!(
                        "Categorical column '{}' has no encoder",
                        column
                    )))
                }
                (FieldKind::Float | FieldKind::Count, true) => {
                    return Err(ArtifactError::Schema(format!(
                        "Numeric column '{}' must not have an encoder",
                        column
                    )))
                }
                _ => {}
            }
        }

        let mut unused: Vec<_> = encoders.keys().filter(|k| !seen.contains(k.as_str())).collect();
        if !unused.is_empty() {
            unused.sort();
            return Err(ArtifactError::Schema(format!(
                "Encoders for {:?} do not match any feature column",
                unused
            )));
        }

        if let Some(width) = model.input_width() {
            if width != columns.len() {
                return Err(ArtifactError::Schema(format!(
                    "Model expects {} features but the column list has {}",
                    width,
                    columns.len()
                )));
            }
        }
        Ok(())
    }

    /// Builds the store after checking the artifacts against each other.
    ///
    /// # Returns
    /// * `Result<ArtifactStore, ArtifactError>` - The store if successful, or an error if:
    ///   - No model, encoders, or feature columns were provided
    ///   - The schema check fails
    pub fn build(self) -> Result<ArtifactStore, ArtifactError> {
        let model = self
            .model
            .ok_or_else(|| ArtifactError::Schema("No risk model loaded".into()))?;
        let feature_columns = self
            .feature_columns
            .ok_or_else(|| ArtifactError::Schema("No feature columns loaded".into()))?;
        let encoders = self.encoders.unwrap_or_default();

        Self::validate_schema(&feature_columns, &encoders, model.as_ref())?;
        info!("Artifact schema validated ({} columns, {} encoded)", feature_columns.len(), encoders.len());

        Ok(ArtifactStore {
            model,
            encoders: Arc::new(encoders),
            feature_columns: Arc::new(feature_columns),
            source: self.source,
        })
    }
}
