use std::collections::HashMap;
use ndarray::Array2;
use serde::Serialize;

use super::encoder::CategoryEncoder;
use super::error::PipelineError;

/// Semantic type of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text, encoded through a [`CategoryEncoder`]
    Categorical,
    /// Floating point number
    Float,
    /// Integer count
    Count,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            Self::Categorical => "text",
            Self::Float => "a number",
            Self::Count => "an integer",
        }
    }
}

/// One field of the submitted form and the feature it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name of the form input
    pub form_name: &'static str,
    /// Feature name the model was trained with
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(form_name: &'static str, name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { form_name, name, kind }
}

/// Every field a prediction request carries.
pub const REQUEST_SCHEMA: [FieldSpec; 14] = [
    field("availability", "availability", FieldKind::Categorical),
    field("brand_name", "brand_name", FieldKind::Categorical),
    field("category", "breadcrumbs", FieldKind::Categorical),
    field("seller_name", "seller_name", FieldKind::Categorical),
    field("list_price", "list_price", FieldKind::Float),
    field("selling_price", "price_value", FieldKind::Float),
    field("rating_count", "rating_count", FieldKind::Count),
    field("product_rating", "rating_stars", FieldKind::Float),
    field("avg_review_rating", "avg_review_rating", FieldKind::Float),
    field("rating_variance", "rating_variance", FieldKind::Float),
    field("review_volume", "review_volume", FieldKind::Count),
    field("negative_review_ratio", "negative_review_ratio", FieldKind::Float),
    field("avg_sentiment", "avg_sentiment", FieldKind::Float),
    field("avg_review_length", "avg_review_length", FieldKind::Float),
];

/// Looks up a field by its feature name.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    REQUEST_SCHEMA.iter().find(|spec| spec.name == name)
}

/// A single raw input value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Categorical(String),
    Float(f64),
    Count(i64),
}

impl RawValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Categorical(_) => FieldKind::Categorical,
            Self::Float(_) => FieldKind::Float,
            Self::Count(_) => FieldKind::Count,
        }
    }

    /// Parses form text according to `kind`.
    ///
    /// Numbers are trimmed before parsing; categorical text is kept verbatim.
    fn parse(text: &str, kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Categorical => Some(Self::Categorical(text.to_string())),
            FieldKind::Float => text.trim().parse().ok().map(Self::Float),
            FieldKind::Count => text.trim().parse().ok().map(Self::Count),
        }
    }
}

/// The raw values of one request, keyed by feature name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    values: HashMap<String, RawValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, replacing any previous value for the same feature
    pub fn with(mut self, name: impl Into<String>, value: RawValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Builds a record from submitted form fields.
    ///
    /// Form names are translated to feature names through [`REQUEST_SCHEMA`].
    /// Fields are checked in schema order, so the first missing or malformed
    /// field is the one reported.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, PipelineError> {
        let mut values = HashMap::with_capacity(REQUEST_SCHEMA.len());
        for spec in &REQUEST_SCHEMA {
            let text = form
                .get(spec.form_name)
                .ok_or_else(|| PipelineError::MissingField(spec.form_name.to_string()))?;
            let value = RawValue::parse(text, spec.kind).ok_or_else(|| PipelineError::InvalidNumber {
                field: spec.form_name.to_string(),
                expected: spec.kind.expected(),
                value: text.clone(),
            })?;
            values.insert(spec.name.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The encoded, column-ordered form of a [`FeatureRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Single-row `[1, n_features]` matrix in the precision the model consumes.
    pub fn to_row(&self) -> Array2<f32> {
        Array2::from_shape_fn((1, self.values.len()), |(_, j)| self.values[j] as f32)
    }
}

/// Encodes `record` in the order given by `columns`.
///
/// Columns with an encoder take the encoder's code (or `-1` for unseen
/// values); every other column passes its number through unchanged.
pub fn build_feature_vector(
    record: &FeatureRecord,
    columns: &[String],
    encoders: &HashMap<String, CategoryEncoder>,
) -> Result<FeatureVector, PipelineError> {
    let mut values = Vec::with_capacity(columns.len());
    for column in columns {
        let raw = record
            .get(column)
            .ok_or_else(|| PipelineError::MissingField(column.clone()))?;
        let value = match (encoders.get(column), raw) {
            (Some(encoder), RawValue::Categorical(text)) => encoder.safe_encode(text) as f64,
            (None, RawValue::Float(x)) => *x,
            (None, RawValue::Count(n)) => *n as f64,
            (Some(_), other) => {
                return Err(PipelineError::Schema(format!(
                    "column '{}' has an encoder but received {:?}",
                    column,
                    other.kind()
                )))
            }
            (None, RawValue::Categorical(_)) => {
                return Err(PipelineError::Schema(format!(
                    "column '{}' is categorical but has no encoder",
                    column
                )))
            }
        };
        values.push(value);
    }
    Ok(FeatureVector { values })
}
