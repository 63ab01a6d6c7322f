use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use sentiment_api::api::{router, AppState};
use sentiment_api::classifier::LogisticPipeline;
use sentiment_api::health::{ApplicationInfo, HealthCheck, ModelInfo};
use sentiment_api::lexicon::LexiconAnalyzer;
use sentiment_api::model::{Model, ModelFile, Stage};
use sentiment_api::preprocess::PreprocessingConfig;
use sentiment_api::service::PredictionService;

fn app_with(model: Model) -> Router {
    let file = ModelFile::new(model, "sentiment-analysis", Stage::Train, PreprocessingConfig::all_enabled());
    let model_info = ModelInfo::from(&file);
    let service = PredictionService::from_file(file);
    let health = HealthCheck::new(service.clone(), Duration::from_secs(2));

    router(Arc::new(AppState {
        service,
        health,
        model_info,
        application: ApplicationInfo {
            maintainer: "ops@example.com".to_string(),
            git_repo: "https://example.com/sentiment-api.git".to_string(),
        },
    }))
}

fn lexicon_app() -> Router {
    app_with(Model::Lexicon(LexiconAnalyzer::default()))
}

async fn send(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_curl(app: Router, body: &str) -> (StatusCode, Value) {
    send(app, Method::POST, "/curl", body).await
}

#[tokio::test]
async fn test_scores_accepted_sentence() {
    let (status, body) = post_curl(lexicon_app(), r#"{"sentence": "I feel good."}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "score": {"neg": 0.0, "neu": 0.256, "pos": 0.744, "compound": 0.4404},
            "status": "complete",
            "sentence": "I feel good."
        })
    );
}

#[tokio::test]
async fn test_get_is_accepted_too() {
    let (status, body) = send(lexicon_app(), Method::GET, "/curl", r#"{"sentence": "I feel bad."}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"]["compound"], json!(-0.5423));
}

#[tokio::test]
async fn test_empty_object_is_rejected() {
    let (status, body) = post_curl(lexicon_app(), "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "status": "error",
            "status_code": "400 - Bad Request",
            "error_message": "Failed to decode JSON object: No key/value pair in JSON. Expecting one, with key of 'sentence'."
        })
    );
}

#[tokio::test]
async fn test_rejections_by_payload_shape() {
    let cases = [
        (
            r#"{"sentence": "hi", "other": "x"}"#,
            "Failed to decode JSON object: More than one key/value pair in JSON. Expecting only one, with key of 'sentence'.",
        ),
        (
            r#"{"sentence": "hi", "sentence": "hi"}"#,
            "Failed to decode JSON object: Repeated key/value pairs in JSON. Expecting only one, with key of 'sentence'.",
        ),
        (
            r#"{"sentence": "hi", "sentence": "bye"}"#,
            "Failed to decode JSON object: More than one value for one key in JSON. Expecting only one, with key of 'sentence'.",
        ),
        (
            r#"{"text": "hi"}"#,
            "Failed to decode JSON object: Expecting key/value pair with key of 'sentence'.",
        ),
        (
            r#"{"sentence": 42}"#,
            "Failed to decode JSON object: Expecting str data type for value in key/value pair (enclosed in double quotes).",
        ),
        (
            r#"{"sentence": "123 !!"}"#,
            "Failed to find English letter in the input sentence. Please try again.",
        ),
    ];

    for (payload, message) in cases {
        let (status, body) = post_curl(lexicon_app(), payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        assert_eq!(body["error_message"], message, "{}", payload);
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (status, body) = post_curl(lexicon_app(), r#"{"sentence": "#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["error_message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to decode JSON object: "));
}

#[tokio::test]
async fn test_classifier_score_shape() {
    let pipeline = LogisticPipeline::new(
        HashMap::from([("good".to_string(), 0)]),
        vec![1.0],
        vec![1, 5],
        vec![vec![2.0]],
        vec![-1.0],
    )
    .unwrap();

    let (status, body) = post_curl(app_with(Model::Classifier(pipeline)), r#"{"sentence": "Good movie"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], json!({"score": "5"}));
    assert_eq!(body["sentence"], "Good movie");
}

#[tokio::test]
async fn test_inference_failure_is_server_error() {
    // Deserialized directly so the out-of-range index survives until inference.
    let broken: LogisticPipeline = serde_json::from_value(json!({
        "vocabulary": {"good": 7}, "idf": [1.0], "classes": [1, 5], "coef": [[1.0]], "intercept": [0.0]
    }))
    .unwrap();

    let (status, body) = post_curl(app_with(Model::Classifier(broken)), r#"{"sentence": "good"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status_code"], "500 - Internal Server Error");
}

#[tokio::test]
async fn test_healthcheck_and_environment() {
    let (status, body) = send(lexicon_app(), Method::GET, "/healthcheck", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["results"][0]["checker"], "prediction_model_available");
    assert_eq!(body["results"][0]["passed"], true);

    let (status, body) = send(lexicon_app(), Method::GET, "/environment", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application"]["maintainer"], "ops@example.com");
    assert_eq!(body["model"]["model_type"], "LexiconAnalyzer");
    assert_eq!(body["preprocessing"]["strip_stop_words"], true);
}

#[tokio::test]
async fn test_form_submission_renders_score() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("sentence=I+feel+good."))
        .unwrap();

    let response = lexicon_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(page.to_vec()).unwrap();
    assert!(page.contains("Compound: 0.4404  (Sentiment Intensity Analyzer)"));
}
