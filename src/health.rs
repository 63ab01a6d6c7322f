//! Prediction health probe, its HTTP report and the background job that runs
//! it on an interval.
//!
//! Slow or wrong probe results are reported and logged. They never take the
//! service out of rotation.

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio_cron_scheduler::{Job, JobScheduler};
use utoipa::ToSchema;

use crate::model::{ModelFile, Score};
use crate::preprocess::PreprocessingConfig;
use crate::service::PredictionService;

pub const CHECKER_NAME: &str = "prediction_model_available";

/// Clearly positive movie review sentence.
pub const PROBE_TEXT: &str = "In addition to Hoffman 's powerful acting clinic , \
    this is that rare drama that offers a thoughtful \
    and rewarding glimpse into the sort of heartache everyone has felt , \
    or will feel someday.";

const RESULT_TTL: f64 = 27.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Ok,
    WrongPrediction,
    Timeout,
    Failed,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckResult {
    #[schema(example = "prediction_model_available")]
    pub checker: String,
    #[schema(example = "Request Response Time OK: 0:00:00.006485")]
    pub output: String,
    pub passed: bool,
    pub timestamp: f64,
    pub expires: f64,
    #[serde(skip)]
    pub status: ProbeStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthReport {
    pub hostname: String,
    #[schema(example = "success")]
    pub status: String,
    pub timestamp: f64,
    pub results: Vec<CheckResult>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationInfo {
    pub maintainer: String,
    pub git_repo: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModelInfo {
    pub model_type: String,
    pub model_name: String,
    pub version: String,
}

impl From<&ModelFile> for ModelInfo {
    fn from(file: &ModelFile) -> Self {
        Self {
            model_type: file.model_type.clone(),
            model_name: file.model_name.clone(),
            version: file.version.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnvironmentReport {
    pub application: ApplicationInfo,
    pub model: ModelInfo,
    pub preprocessing: PreprocessingConfig,
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: PredictionService,
    budget: Duration,
}

impl HealthCheck {
    pub fn new(service: PredictionService, budget: Duration) -> Self {
        Self { service, budget }
    }

    pub fn check_prediction(&self) -> CheckResult {
        let started = Instant::now();
        let outcome = self.service.score_sentence(PROBE_TEXT);
        let elapsed = started.elapsed();

        let (status, output) = match outcome {
            Ok(score) => probe_output(elapsed, self.budget, &score),
            Err(e) => (ProbeStatus::Failed, format!("Prediction failed: {}", e)),
        };

        let timestamp = unix_now();
        CheckResult {
            checker: CHECKER_NAME.to_string(),
            output,
            passed: status != ProbeStatus::Failed,
            timestamp,
            expires: timestamp + RESULT_TTL,
            status,
        }
    }

    pub fn run(&self) -> HealthReport {
        let results = vec![self.check_prediction()];
        let status = if results.iter().all(|r| r.passed) { "success" } else { "failure" };

        HealthReport {
            hostname: hostname(),
            status: status.to_string(),
            timestamp: unix_now(),
            results,
        }
    }
}

/// Probe verdict and the line reported for it.
pub fn probe_output(elapsed: Duration, budget: Duration, score: &Score) -> (ProbeStatus, String) {
    if elapsed > budget {
        return (
            ProbeStatus::Timeout,
            format!("Request Response Timeout (>{}s): {}", budget.as_secs_f64(), format_elapsed(elapsed)),
        );
    }

    let mut output = format!("Request Response Time OK: {}", format_elapsed(elapsed));
    if score.is_positive() {
        (ProbeStatus::Ok, output)
    } else {
        output.push_str(&format!(", but WRONG Prediction: {} != positive", score));
        (ProbeStatus::WrongPrediction, output)
    }
}

/// `H:MM:SS[.ffffff]`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
    match elapsed.subsec_micros() {
        0 => format!("{}:{:02}:{:02}", h, m, s),
        micros => format!("{}:{:02}:{:02}.{:06}", h, m, s, micros),
    }
}

fn log_result(result: &CheckResult) {
    match result.status {
        ProbeStatus::Ok => tracing::info!(output = %result.output, "I am working... and Request Response Time OK"),
        ProbeStatus::WrongPrediction => tracing::warn!(output = %result.output, "I am working... but WRONG prediction"),
        ProbeStatus::Timeout => tracing::warn!(output = %result.output, "I am working... BUT Response Timeout"),
        ProbeStatus::Failed => tracing::error!(output = %result.output, "health probe could not predict"),
    }
}

/// Starts the repeated background probe. Keep the returned scheduler alive
/// for as long as the probe should run.
pub async fn start_scheduler(check: HealthCheck, interval: Duration) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| anyhow!("failed to create scheduler: {:?}", e))?;

    let job = Job::new_repeated_async(interval, move |_id, _scheduler| {
        let check = check.clone();
        Box::pin(async move {
            match tokio::task::spawn_blocking(move || check.check_prediction()).await {
                Ok(result) => log_result(&result),
                Err(e) => tracing::error!(error = %e, "health probe task panicked"),
            }
        })
    })
    .map_err(|e| anyhow!("failed to create health job: {:?}", e))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| anyhow!("failed to schedule health job: {:?}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| anyhow!("failed to start scheduler: {:?}", e))?;

    tracing::info!(interval_secs = interval.as_secs(), "health probe scheduled");
    Ok(scheduler)
}

fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
