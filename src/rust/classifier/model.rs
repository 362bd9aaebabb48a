use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};
use log::info;

use super::error::PipelineError;
use super::features::FeatureVector;
use crate::artifacts::ArtifactError;
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Number of risk classes every model must score.
pub const NUM_CLASSES: usize = 3;

/// A trained classifier seen as a black box.
///
/// Implementations must be pure from the caller's point of view: scoring the
/// same vector twice gives the same answer and leaves no trace on the model.
pub trait RiskModel: Send + Sync + fmt::Debug {
    /// Index of the highest scoring class under the model's own decision rule.
    fn predict(&self, vector: &FeatureVector) -> Result<i64, PipelineError>;

    /// Probability of each class, in class-id order.
    fn predict_proba(&self, vector: &FeatureVector) -> Result<Vec<f32>, PipelineError>;

    /// Both answers at once. Models that produce them in one pass override this.
    fn score(&self, vector: &FeatureVector) -> Result<(i64, Vec<f32>), PipelineError> {
        Ok((self.predict(vector)?, self.predict_proba(vector)?))
    }

    /// Width of the input the model was exported with, when it is fixed.
    fn input_width(&self) -> Option<usize> {
        None
    }
}

/// A classifier exported to ONNX and executed with ONNX Runtime.
///
/// The graph is expected to look like a standard classifier export:
/// - one float input of shape `[batch, n_features]`
/// - a `label` (or `output_label`) output holding the predicted class id (int64)
/// - a `probabilities` (or `output_probability`) output of shape
///   `[batch, n_classes]` (float)
///
/// When the outputs are not named that way, the first output is taken as the
/// label and the second as the probabilities. Element types are checked when
/// the model is loaded, so an export that wraps the probabilities in a
/// ZipMap is refused at startup instead of failing on the first request.
#[derive(Debug)]
pub struct OnnxRiskModel {
    session: Session,
    input_name: String,
    label_output: usize,
    proba_output: usize,
    input_width: Option<usize>,
}

const LABEL_OUTPUT_NAMES: [&str; 2] = ["label", "output_label"];
const PROBA_OUTPUT_NAMES: [&str; 2] = ["probabilities", "output_probability"];

impl OnnxRiskModel {
    pub fn load(path: &Path, config: &RuntimeConfig) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }
        let session = create_session_builder(config)?.commit_from_file(path)?;
        Self::validate_model(&session)?;

        let input_name = session.inputs[0].name.clone();
        let input_width = session.inputs[0]
            .input_type
            .tensor_dimensions()
            .and_then(|dims| dims.get(1).copied())
            .filter(|&d| d > 0)
            .map(|d| d as usize);
        let output_index = |names: &[&str], fallback: usize| {
            session
                .outputs
                .iter()
                .position(|o| names.contains(&o.name.as_str()))
                .unwrap_or(fallback)
        };
        let label_output = output_index(&LABEL_OUTPUT_NAMES, 0);
        let proba_output = output_index(&PROBA_OUTPUT_NAMES, 1);

        ModelSignature {
            input: tensor_element(&session.inputs[0].input_type),
            label: tensor_element(&session.outputs[label_output].output_type),
            probabilities: tensor_element(&session.outputs[proba_output].output_type),
            label_output,
            proba_output,
        }
        .check()?;

        info!(
            "Loaded risk model from {:?} (input '{}', width {:?}, label '{}', probabilities '{}')",
            path,
            input_name,
            input_width,
            session.outputs[label_output].name,
            session.outputs[proba_output].name
        );
        Ok(Self {
            session,
            input_name,
            label_output,
            proba_output,
            input_width,
        })
    }

    /// The model needs a single tensor input and both classifier outputs
    fn validate_model(session: &Session) -> Result<(), ArtifactError> {
        if session.inputs.len() != 1 {
            return Err(ArtifactError::Model(format!(
                "Model must have exactly 1 input (the feature row), found {}",
                session.inputs.len()
            )));
        }
        if session.outputs.len() < 2 {
            return Err(ArtifactError::Model(format!(
                "Model must have at least 2 outputs (label and probabilities), found {}",
                session.outputs.len()
            )));
        }
        Ok(())
    }

    fn run(&self, vector: &FeatureVector) -> Result<(i64, Vec<f32>), PipelineError> {
        let row = vector.to_row().into_dyn();
        let input = row.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input)
                .map_err(|e| PipelineError::Model(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| PipelineError::Model(format!("Failed to run model: {}", e)))?;

        let labels = outputs[self.label_output]
            .try_extract_tensor::<i64>()
            .map_err(|e| PipelineError::Model(format!("Failed to extract label tensor: {}", e)))?;
        let class_id = labels
            .iter()
            .next()
            .copied()
            .ok_or_else(|| PipelineError::Prediction("Model returned no label".into()))?;

        let probabilities = outputs[self.proba_output]
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::Model(format!("Failed to extract probability tensor: {}", e)))?;
        let probabilities: Vec<f32> = probabilities.iter().copied().collect();

        Ok((class_id, probabilities))
    }
}

impl RiskModel for OnnxRiskModel {
    fn predict(&self, vector: &FeatureVector) -> Result<i64, PipelineError> {
        self.run(vector).map(|(class_id, _)| class_id)
    }

    fn predict_proba(&self, vector: &FeatureVector) -> Result<Vec<f32>, PipelineError> {
        self.run(vector).map(|(_, probabilities)| probabilities)
    }

    fn score(&self, vector: &FeatureVector) -> Result<(i64, Vec<f32>), PipelineError> {
        self.run(vector)
    }

    fn input_width(&self) -> Option<usize> {
        self.input_width
    }
}

fn tensor_element(value_type: &ValueType) -> Option<TensorElementType> {
    match value_type {
        ValueType::Tensor { ty, .. } => Some(*ty),
        _ => None,
    }
}

/// Element types of the tensors the pipeline reads and writes; `None` marks a
/// value that is not a tensor at all (a sequence or map).
#[derive(Debug, Clone, Copy, PartialEq)]
struct ModelSignature {
    input: Option<TensorElementType>,
    label: Option<TensorElementType>,
    probabilities: Option<TensorElementType>,
    label_output: usize,
    proba_output: usize,
}

impl ModelSignature {
    fn check(&self) -> Result<(), ArtifactError> {
        if self.label_output == self.proba_output {
            return Err(ArtifactError::Model(format!(
                "Label and probabilities both resolve to output {}",
                self.label_output
            )));
        }
        if self.input != Some(TensorElementType::Float32) {
            return Err(ArtifactError::Model(format!(
                "Model input must be a float32 tensor, found {:?}",
                self.input
            )));
        }
        if self.label != Some(TensorElementType::Int64) {
            return Err(ArtifactError::Model(format!(
                "Label output {} must be an int64 tensor, found {:?}",
                self.label_output, self.label
            )));
        }
        if self.probabilities != Some(TensorElementType::Float32) {
            return Err(ArtifactError::Model(format!(
                "Probabilities output {} must be a float32 tensor, found {:?} \
                 (export the classifier with zipmap=False)",
                self.proba_output, self.probabilities
            )));
        }
        Ok(())
    }
}
