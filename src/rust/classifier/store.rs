use std::collections::HashMap;
use std::sync::Arc;
use log::{debug, info};

use super::assessment::RiskAssessment;
use super::encoder::CategoryEncoder;
use super::error::PipelineError;
use super::features::{build_feature_vector, FeatureRecord, FeatureVector};
use super::model::RiskModel;

/// The trained artifacts, loaded once and shared read-only by every request.
///
/// # Thread Safety
///
/// The store is `Send + Sync`: the model is required to be `Send + Sync` by
/// [`RiskModel`], and the encoders and column list are never mutated after
/// [`ArtifactStoreBuilder::build`](super::ArtifactStoreBuilder::build). Share
/// it across handlers with `Arc`:
///
/// ```rust,no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use risklens::ArtifactStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(ArtifactStore::builder().with_model_dir("model")?.build()?);
/// let handle = Arc::clone(&store);
/// std::thread::spawn(move || println!("{} columns", handle.info().num_columns));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ArtifactStore {
    pub(super) model: Arc<dyn RiskModel>,
    pub(super) encoders: Arc<HashMap<String, CategoryEncoder>>,
    pub(super) feature_columns: Arc<Vec<String>>,
    pub(super) source: Option<String>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ArtifactStore>();
    }
};

impl ArtifactStore {
    /// Creates a new ArtifactStoreBuilder for fluent construction
    pub fn builder() -> super::builder::ArtifactStoreBuilder {
        super::builder::ArtifactStoreBuilder::new()
    }

    /// Returns information about the loaded artifacts
    pub fn info(&self) -> super::StoreInfo {
        let mut encoded_columns: Vec<String> = self.encoders.keys().cloned().collect();
        encoded_columns.sort();
        super::StoreInfo {
            source: self.source.clone(),
            num_columns: self.feature_columns.len(),
            feature_columns: self.feature_columns.as_ref().clone(),
            encoded_columns,
        }
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Encodes a record in training column order.
    pub fn encode(&self, record: &FeatureRecord) -> Result<FeatureVector, PipelineError> {
        build_feature_vector(record, &self.feature_columns, &self.encoders)
    }

    /// Scores one product: encode, classify, then pick the presentation.
    ///
    /// Nothing reaches the classifier unless the whole record encodes.
    pub fn assess(&self, record: &FeatureRecord) -> Result<RiskAssessment, PipelineError> {
        let vector = self.encode(record)?;
        debug!("Encoded feature vector: {:?}", vector.values());

        let (class_id, probabilities) = self.model.score(&vector)?;
        let assessment = RiskAssessment::from_prediction(class_id, probabilities)?;

        info!(
            "Predicted {} ({}% confidence)",
            assessment.risk,
            assessment.confidence_display()
        );
        Ok(assessment)
    }
}
