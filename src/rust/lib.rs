//! Product review risk scoring behind a small web front-end.
//!
//! A pre-trained classifier, its categorical encoders and the ordered list of
//! training columns are loaded once into an [`ArtifactStore`]. Each request
//! is turned into a [`FeatureRecord`], encoded in training column order
//! (unseen categories become `-1`), scored, and mapped to one of three risk
//! levels with a fixed explanation and recommended action.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use risklens::{ArtifactStore, FeatureRecord, FeatureVector, PipelineError, RawValue, RiskModel};
//!
//! #[derive(Debug)]
//! struct AlwaysLow;
//!
//! impl RiskModel for AlwaysLow {
//!     fn predict(&self, _: &FeatureVector) -> Result<i64, PipelineError> {
//!         Ok(0)
//!     }
//!     fn predict_proba(&self, _: &FeatureVector) -> Result<Vec<f32>, PipelineError> {
//!         Ok(vec![0.9, 0.08, 0.02])
//!     }
//! }
//!
//! let store = ArtifactStore::builder()
//!     .with_model(AlwaysLow)
//!     .add_encoder("brand_name", vec!["Acme", "Globex"])?
//!     .with_feature_columns(vec!["brand_name", "list_price"])
//!     .build()?;
//!
//! let record = FeatureRecord::new()
//!     .with("brand_name", RawValue::Categorical("Initech".into()))
//!     .with("list_price", RawValue::Float(19.99));
//!
//! let assessment = store.assess(&record)?;
//! assert_eq!(assessment.risk.label(), "Low Risk");
//! assert_eq!(assessment.confidence_display(), "90.0");
//! # Ok(())
//! # }
//! ```
//!
//! In production the store is loaded from a model directory with
//! [`ArtifactStoreBuilder::with_model_dir`], which runs the ONNX export of the
//! classifier through ONNX Runtime.

pub mod artifacts;
pub mod classifier;
pub mod config;
mod runtime;
pub mod server;

pub use artifacts::{ArtifactError, ArtifactManager};
pub use classifier::{
    confidence_percent, ArtifactStore, ArtifactStoreBuilder, CategoryEncoder, FeatureRecord, FeatureVector, FieldKind,
    OnnxRiskModel, PipelineError, RawValue, RiskAssessment, RiskLevel, RiskModel, StoreInfo,
    REQUEST_SCHEMA, UNKNOWN_CATEGORY,
};
pub use config::ServerConfig;
pub use runtime::{create_session_builder, OptimizationLevel, RuntimeConfig};

pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
