use std::collections::HashMap;
use std::sync::Arc;
use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use log::{error, warn};
use serde_json::json;

use crate::classifier::{ArtifactStore, FeatureRecord, PipelineError, RiskAssessment, RiskLevel};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage;

#[derive(Template)]
#[template(path = "result.html")]
struct ResultPage {
    risk: &'static str,
    risk_class: &'static str,
    confidence: String,
    explanation: [&'static str; 3],
    recommended_action: [&'static str; 3],
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage {
    message: String,
}

/// Builds the HTTP routes around a loaded store.
///
/// - `GET /` input form
/// - `POST /predict` rendered result page
/// - `POST /api/predict` result as JSON
/// - `GET /health` liveness check
pub fn router(store: Arc<ArtifactStore>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/api/predict", post(api_predict))
        .route("/health", get(health))
        .with_state(store)
}

/// Parses the submitted form and runs it through the pipeline.
pub fn assess_form(
    store: &ArtifactStore,
    form: &HashMap<String, String>,
) -> Result<RiskAssessment, PipelineError> {
    let record = FeatureRecord::from_form(form)?;
    store.assess(&record)
}

/// Collapses repeated form fields, keeping the first value of each name.
fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut form = HashMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        form.entry(name).or_insert(value);
    }
    form
}

async fn index() -> Response {
    render_page(StatusCode::OK, &IndexPage)
}

async fn health() -> &'static str {
    "ok"
}

async fn predict(
    State(store): State<Arc<ArtifactStore>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    match assess_form(&store, &first_values(pairs)) {
        Ok(assessment) => render_page(StatusCode::OK, &result_page(&assessment)),
        Err(err) => {
            let status = failure_status(&err);
            render_page(status, &ErrorPage { message: err.to_string() })
        }
    }
}

async fn api_predict(
    State(store): State<Arc<ArtifactStore>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    match assess_form(&store, &first_values(pairs)) {
        Ok(assessment) => Json(assessment).into_response(),
        Err(err) => {
            let status = failure_status(&err);
            (status, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

fn failure_status(err: &PipelineError) -> StatusCode {
    if err.is_client_error() {
        warn!("Rejected prediction request: {}", err);
        StatusCode::BAD_REQUEST
    } else {
        warn!("Prediction failed: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn render_page<T: Template>(status: StatusCode, page: &T) -> Response {
    match page.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render page: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn risk_class(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Low => "low",
        RiskLevel::Medium => "medium",
        RiskLevel::High => "high",
    }
}

fn result_page(assessment: &RiskAssessment) -> ResultPage {
    ResultPage {
        risk: assessment.risk.label(),
        risk_class: risk_class(assessment.risk),
        confidence: assessment.confidence_display(),
        explanation: assessment.explanation,
        recommended_action: assessment.recommended_action,
    }
}

/// Renders the result page for one assessment.
pub fn render_result(assessment: &RiskAssessment) -> Result<String, askama::Error> {
    result_page(assessment).render()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_render_result_contains_everything() {
        let assessment = RiskAssessment::from_prediction(0, vec![0.91, 0.06, 0.03]).unwrap();
        let html = render_result(&assessment).unwrap();
        assert!(html.contains("<title>Low Risk</title>"));
        assert!(html.contains("class=\"low\">Low Risk</h1>"));
        assert!(html.contains("91.0%"));
        for line in assessment.explanation.iter().chain(assessment.recommended_action.iter()) {
            assert!(html.contains(&format!("<li>{}</li>", line)), "missing {:?}", line);
        }
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_error_page_escapes_input() {
        let err = PipelineError::InvalidNumber {
            field: "list_price".into(),
            expected: "a number",
            value: "<script>".into(),
        };
        let html = ErrorPage { message: err.to_string() }.render().unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<title>Error</title>"));
    }

    #[test]
    fn test_index_form_has_every_field() {
        let html = IndexPage.render().unwrap();
        for spec in crate::classifier::REQUEST_SCHEMA.iter() {
            assert!(
                html.contains(&format!("name=\"{}\"", spec.form_name)),
                "form is missing {}",
                spec.form_name
            );
        }
    }

    #[test]
    fn test_first_value_of_repeated_field_wins() {
        let form = first_values(pairs(&[
            ("list_price", "10"),
            ("brand_name", "Acme"),
            ("list_price", "abc"),
        ]));
        assert_eq!(form.len(), 2);
        assert_eq!(form["list_price"], "10");
        assert_eq!(form["brand_name"], "Acme");
    }
}
