pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::prediction::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/predict", post(handlers::handle_predict))
        .route("/predict-batch", post(handlers::handle_predict_batch))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::classifier::loader::load_model;
    use crate::classifier::testing::{handle, MockClassifier};
    use crate::config::Config;
    use crate::prediction::service::PredictionService;

    fn unloaded_state() -> AppState {
        AppState::new(Config::default())
    }

    fn forest_state() -> AppState {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/career_compass_rf.json");
        let state = unloaded_state();
        state
            .install(PredictionService::new(load_model(&path).unwrap()))
            .unwrap();
        state
    }

    fn mock_state(mock: MockClassifier) -> AppState {
        let state = unloaded_state();
        state.install(PredictionService::new(handle(mock))).unwrap();
        state
    }

    async fn send(state: AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        };
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();

        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn scenario() -> Value {
        json!({
            "skills": ["Python", "Machine Learning", "Data Analysis", "SQL"],
            "education": "Bachelor of Science",
            "job_experience": 3
        })
    }

    #[tokio::test]
    async fn test_root_is_always_available() {
        let (status, body) = send(unloaded_state(), Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["message"], "Career Compass ML API is running!");
    }

    #[tokio::test]
    async fn test_health_reports_not_loaded_before_install() {
        let (status, body) = send(unloaded_state(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model_status"], "not loaded");
        assert_eq!(body["api_version"], "1.0.0");
        assert!(body.get("model").is_none());
    }

    #[tokio::test]
    async fn test_health_reports_loaded_after_install() {
        let (_, body) = send(forest_state(), Method::GET, "/health", None).await;
        assert_eq!(body["model_status"], "loaded");
        assert_eq!(body["model"]["kind"], "random_forest");
        assert_eq!(body["model"]["capabilities"]["probabilities"], true);
    }

    #[tokio::test]
    async fn test_predict_scenario_against_bundled_model() {
        let (status, body) = send(forest_state(), Method::POST, "/predict", Some(scenario())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(!body["predicted_job_role"].as_str().unwrap().is_empty());

        let confidence = body["confidence"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&confidence));

        let total: f64 = body["probabilities"]
            .as_object()
            .unwrap()
            .values()
            .map(|v| v.as_f64().unwrap())
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_csv_and_list_skills_predict_identically() {
        let state = forest_state();
        let csv = json!({ "skills": "Python, SQL", "education": "Master of Science", "job_experience": 4 });
        let list = json!({ "skills": ["Python", "SQL"], "education": "Master of Science", "job_experience": 4 });

        let (_, a) = send(state.clone(), Method::POST, "/predict", Some(csv)).await;
        let (_, b) = send(state, Method::POST, "/predict", Some(list)).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_repeated_predictions_are_identical() {
        let state = forest_state();
        let (_, a) = send(state.clone(), Method::POST, "/predict", Some(scenario())).await;
        let (_, b) = send(state, Method::POST, "/predict", Some(scenario())).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_with_validation_error() {
        let (status, body) = send(
            forest_state(),
            Method::POST,
            "/predict",
            Some(json!({ "skills": ["Python"] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_negative_experience_rejected_zero_accepted() {
        let state = forest_state();
        let mut request = scenario();

        request["job_experience"] = json!(-1);
        let (status, body) = send(state.clone(), Method::POST, "/predict", Some(request.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        request["job_experience"] = json!(0);
        let (status, _) = send(state, Method::POST, "/predict", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_predict_without_model_is_unavailable() {
        let (status, body) = send(unloaded_state(), Method::POST, "/predict", Some(scenario())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "MODEL_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_predict_without_probabilities_degrades_confidence() {
        let (status, body) = send(
            mock_state(MockClassifier::bare()),
            Method::POST,
            "/predict",
            Some(scenario()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["confidence"], 0.5);
        assert_eq!(body["probabilities"], json!({}));
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_count() {
        let batch = json!([
            { "skills": ["Python", "Machine Learning"], "education": "Bachelor of Science", "job_experience": 2 },
            { "skills": ["Java", "Spring Boot", "Microservices"], "education": "Master of Science", "job_experience": 5 },
            { "skills": "React, JavaScript, CSS", "education": "Bachelor of Arts", "job_experience": 1 }
        ]);
        let state = forest_state();
        let (status, body) = send(state.clone(), Method::POST, "/predict-batch", Some(batch.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_processed"], 3);

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        for (i, item) in results.iter().enumerate() {
            assert_eq!(item["success"], true);
            let (_, single) = send(state.clone(), Method::POST, "/predict", Some(batch[i].clone())).await;
            assert_eq!(item, &single);
        }
    }

    #[tokio::test]
    async fn test_batch_with_invalid_element_is_rejected_whole() {
        let batch = json!([scenario(), { "skills": ["SQL"], "education": "PhD", "job_experience": -5 }]);
        let (status, body) = send(forest_state(), Method::POST, "/predict-batch", Some(batch)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]["message"].as_str().unwrap().starts_with("[1]"));
    }

    #[tokio::test]
    async fn test_batch_over_limit_is_rejected() {
        let mut config = Config::default();
        config.max_batch_size = 2;
        let state = AppState::new(config);
        let batch = json!([scenario(), scenario(), scenario()]);
        let (status, _) = send(state, Method::POST, "/predict-batch", Some(batch)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_batch_without_model_is_unavailable() {
        let (status, _) = send(
            unloaded_state(),
            Method::POST,
            "/predict-batch",
            Some(json!([scenario()])),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_empty_batch_returns_zero_processed() {
        let (status, body) = send(forest_state(), Method::POST, "/predict-batch", Some(json!([]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_processed"], 0);
        assert_eq!(body["results"], json!([]));
    }
}
