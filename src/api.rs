use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::error::{ApiError, ErrorResponse};
use crate::health::{ApplicationInfo, CheckResult, EnvironmentReport, HealthCheck, HealthReport, ModelInfo};
use crate::payload::RawPayload;
use crate::preprocess::PreprocessingConfig;
use crate::service::{PredictionResponse, PredictionService};
use crate::ui::{self, SentenceForm};

/// Shared, read-only state built once at startup.
pub struct AppState {
    pub service: PredictionService,
    pub health: HealthCheck,
    pub model_info: ModelInfo,
    pub application: ApplicationInfo,
}

/// Documentation-only shape of the `/curl` body. The real extractor keeps
/// every key, duplicates included.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SentenceRequest {
    #[schema(example = "I feel good.")]
    pub sentence: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(curl_scoring, healthcheck, environment),
    components(
        schemas(
            SentenceRequest,
            PredictionResponse,
            ErrorResponse,
            HealthReport,
            CheckResult,
            EnvironmentReport,
            ApplicationInfo,
            ModelInfo,
            PreprocessingConfig,
        )
    ),
    tags(
        (name = "sentiment", description = "Sentence sentiment scoring"),
        (name = "ops", description = "Health and environment")
    )
)]
pub struct ApiDoc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/curl", get(curl_scoring).post(curl_scoring))
        .route("/healthcheck", get(healthcheck))
        .route("/environment", get(environment))
        .route("/", get(form_page).post(form_submit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Score one sentence
#[utoipa::path(
    post,
    path = "/curl",
    request_body = SentenceRequest,
    responses(
        (status = 200, description = "Sentence scored", body = PredictionResponse),
        (status = 400, description = "Malformed or rejected payload", body = ErrorResponse),
        (status = 500, description = "Model inference failed", body = ErrorResponse)
    ),
    tag = "sentiment"
)]
pub async fn curl_scoring(
    State(state): State<Arc<AppState>>,
    payload: RawPayload,
) -> Result<Json<PredictionResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("curl_scoring", %request_id);

    span.in_scope(|| -> Result<Json<PredictionResponse>, ApiError> {
        let response = state.service.handle(&payload)?;
        tracing::info!(score = %response.score, "sentence scored");
        Ok(Json(response))
    })
}

/// Run the prediction probe now
#[utoipa::path(
    get,
    path = "/healthcheck",
    responses(
        (status = 200, description = "All checks passed", body = HealthReport),
        (status = 500, description = "At least one check failed", body = HealthReport)
    ),
    tag = "ops"
)]
pub async fn healthcheck(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.health.run();
    let status = if report.status == "success" {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report))
}

/// Describe the running application and its model
#[utoipa::path(
    get,
    path = "/environment",
    responses((status = 200, description = "Application and model metadata", body = EnvironmentReport)),
    tag = "ops"
)]
pub async fn environment(State(state): State<Arc<AppState>>) -> Json<EnvironmentReport> {
    Json(EnvironmentReport {
        application: state.application.clone(),
        model: state.model_info.clone(),
        preprocessing: *state.service.preprocessing(),
    })
}

async fn form_page() -> Html<String> {
    Html(ui::render("", None))
}

async fn form_submit(State(state): State<Arc<AppState>>, Form(form): Form<SentenceForm>) -> Html<String> {
    let flash = ui::submit(&state.service, &form);
    Html(ui::render(&form.sentence, Some(&flash)))
}
