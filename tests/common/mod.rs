#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use risklens::{ArtifactStore, FeatureVector, PipelineError, RiskModel, REQUEST_SCHEMA};

/// Training column order used by the fixtures; deliberately not the form order.
pub const COLUMNS: [&str; 14] = [
    "list_price",
    "price_value",
    "brand_name",
    "rating_count",
    "rating_stars",
    "breadcrumbs",
    "avg_review_rating",
    "rating_variance",
    "review_volume",
    "negative_review_ratio",
    "avg_sentiment",
    "avg_review_length",
    "availability",
    "seller_name",
];

/// A stand-in classifier returning a fixed answer and remembering what it saw.
#[derive(Debug, Clone)]
pub struct ScriptedModel {
    class_id: i64,
    probabilities: Vec<f32>,
    calls: Arc<AtomicUsize>,
    last_vector: Arc<Mutex<Option<Vec<f64>>>>,
}

impl ScriptedModel {
    pub fn new(class_id: i64, probabilities: Vec<f32>) -> Self {
        Self {
            class_id,
            probabilities,
            calls: Arc::new(AtomicUsize::new(0)),
            last_vector: Arc::new(Mutex::new(None)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_vector(&self) -> Option<Vec<f64>> {
        self.last_vector.lock().unwrap().clone()
    }

    fn record(&self, vector: &FeatureVector) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_vector.lock().unwrap() = Some(vector.values().to_vec());
    }
}

impl RiskModel for ScriptedModel {
    fn predict(&self, vector: &FeatureVector) -> Result<i64, PipelineError> {
        self.record(vector);
        Ok(self.class_id)
    }

    fn predict_proba(&self, _vector: &FeatureVector) -> Result<Vec<f32>, PipelineError> {
        Ok(self.probabilities.clone())
    }

    fn input_width(&self) -> Option<usize> {
        Some(COLUMNS.len())
    }
}

pub fn store_with(model: ScriptedModel) -> ArtifactStore {
    ArtifactStore::builder()
        .with_model(model)
        .add_encoder("availability", vec!["InStock", "OutOfStock"])
        .unwrap()
        .add_encoder("brand_name", vec!["Acme", "Globex", "Initech"])
        .unwrap()
        .add_encoder("breadcrumbs", vec!["Home > Kitchen", "Toys"])
        .unwrap()
        .add_encoder("seller_name", vec!["Acme Store", "Bargain Bin"])
        .unwrap()
        .with_feature_columns(COLUMNS.to_vec())
        .build()
        .expect("fixture store should build")
}

pub fn valid_form() -> HashMap<String, String> {
    [
        ("availability", "InStock"),
        ("brand_name", "Globex"),
        ("category", "Toys"),
        ("seller_name", "Bargain Bin"),
        ("list_price", "49.5"),
        ("selling_price", "39.25"),
        ("rating_count", "120"),
        ("product_rating", "4.5"),
        ("avg_review_rating", "4.25"),
        ("rating_variance", "0.75"),
        ("review_volume", "95"),
        ("negative_review_ratio", "0.125"),
        ("avg_sentiment", "0.5"),
        ("avg_review_length", "180.5"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn form_body(form: &HashMap<String, String>) -> String {
    REQUEST_SCHEMA
        .iter()
        .filter_map(|spec| {
            form.get(spec.form_name)
                .map(|v| format!("{}={}", spec.form_name, url_encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn url_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => (b as char).to_string(),
            b' ' => "+".to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}
