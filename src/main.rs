use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use sentiment_api::api::{self, AppState};
use sentiment_api::config::Config;
use sentiment_api::health::{self, ApplicationInfo, HealthCheck, ModelInfo};
use sentiment_api::model::ModelFile;
use sentiment_api::service::PredictionService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    if !config.model_file.exists() {
        bail!(
            "model file {} not found; run `cargo run --bin export_model` or set MODEL_FILE",
            config.model_file.display()
        );
    }
    let file = ModelFile::load(&config.model_file)?;
    let model_info = ModelInfo::from(&file);
    let service = PredictionService::from_file(file);

    let health = HealthCheck::new(service.clone(), config.healthcheck_budget);
    // Dropping the scheduler would stop the probe.
    let _scheduler = health::start_scheduler(health.clone(), config.healthcheck_interval).await?;

    let state = Arc::new(AppState {
        service,
        health,
        model_info,
        application: ApplicationInfo {
            maintainer: config.maintainer.clone(),
            git_repo: config.repository.clone(),
        },
    });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
