use serde::Serialize;
use std::fmt;

use super::error::PipelineError;
use super::model::NUM_CLASSES;

/// The three risk classes, in class-id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; NUM_CLASSES] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn from_class_id(class_id: i64) -> Option<Self> {
        match class_id {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            _ => None,
        }
    }

    pub fn class_id(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }

    /// Plain-language reading of the prediction
    pub fn explanation(self) -> [&'static str; 3] {
        match self {
            Self::High => [
                "Many customers are unhappy with this product.",
                "Negative feedback may reduce buyer trust.",
                "Selling this product now may impact brand reputation.",
            ],
            Self::Medium => [
                "Customer feedback is mixed.",
                "Some buyers are satisfied, while others face issues.",
                "The product needs attention but is not critical.",
            ],
            Self::Low => [
                "Most customers are satisfied.",
                "Reviews are consistent and positive.",
                "The product is performing well.",
            ],
        }
    }

    pub fn recommended_action(self) -> [&'static str; 3] {
        match self {
            Self::High => [
                "Fix common customer complaints.",
                "Improve product quality or description.",
                "Delay promotions until reviews improve.",
            ],
            Self::Medium => [
                "Monitor new reviews closely.",
                "Address repeated customer issues.",
                "Improve customer support and communication.",
            ],
            Self::Low => [
                "Proceed with promotions.",
                "Maintain current quality standards.",
                "Use this product for marketing campaigns.",
            ],
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Converts a probability to a percentage rounded to one decimal place.
///
/// Ties round away from zero. The input is clamped to `[0, 1]` so the result
/// always lies in `[0, 100]`.
pub fn confidence_percent(probability: f32) -> f64 {
    let p = f64::from(probability).clamp(0.0, 1.0);
    (p * 1000.0).round() / 10.0
}

/// The outcome of scoring one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk: RiskLevel,
    pub class_id: usize,
    /// Probability of the predicted class as a percentage, one decimal place
    pub confidence: f64,
    pub probabilities: Vec<f32>,
    pub explanation: [&'static str; 3],
    pub recommended_action: [&'static str; 3],
}

impl RiskAssessment {
    /// Builds the assessment for a classifier answer.
    ///
    /// Fails when the class id is not one of the three risk classes, when the
    /// distribution does not have one entry per class, or when it holds a
    /// non-finite value.
    pub fn from_prediction(class_id: i64, probabilities: Vec<f32>) -> Result<Self, PipelineError> {
        let risk = RiskLevel::from_class_id(class_id)
            .ok_or_else(|| PipelineError::Prediction(format!("Unknown class id {}", class_id)))?;
        if probabilities.len() != NUM_CLASSES {
            return Err(PipelineError::Prediction(format!(
                "Expected {} class probabilities, got {}",
                NUM_CLASSES,
                probabilities.len()
            )));
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(PipelineError::Prediction(format!(
                "Non-finite class probability in {:?}",
                probabilities
            )));
        }

        let confidence = confidence_percent(probabilities[risk.class_id()]);
        Ok(Self {
            risk,
            class_id: risk.class_id(),
            confidence,
            probabilities,
            explanation: risk.explanation(),
            recommended_action: risk.recommended_action(),
        })
    }

    /// Confidence as shown to the user, e.g. `"80.0"`
    pub fn confidence_display(&self) -> String {
        format!("{:.1}", self.confidence)
    }
}
