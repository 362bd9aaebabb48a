mod assessment;
mod builder;
mod encoder;
mod error;
mod features;
mod model;
mod store;

pub use assessment::{confidence_percent, RiskAssessment, RiskLevel};
pub use builder::ArtifactStoreBuilder;
pub use encoder::{CategoryEncoder, UNKNOWN_CATEGORY};
pub use error::PipelineError;
pub use features::{
    build_feature_vector, field_spec, FeatureRecord, FeatureVector, FieldKind, FieldSpec, RawValue,
    REQUEST_SCHEMA,
};
pub use model::{OnnxRiskModel, RiskModel, NUM_CLASSES};
pub use store::ArtifactStore;

use serde::Serialize;

/// Summary of a loaded [`ArtifactStore`]
#[derive(Debug, Clone, Serialize)]
pub struct StoreInfo {
    /// Directory the artifacts were read from, if any
    pub source: Option<String>,
    pub num_columns: usize,
    pub feature_columns: Vec<String>,
    /// Columns that go through a categorical encoder, sorted
    pub encoded_columns: Vec<String>,
}
