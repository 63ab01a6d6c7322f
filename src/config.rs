//! Process configuration, read once from the environment (and `.env`).
//!
//! Preprocessing toggles are deliberately absent: they travel inside the
//! model file.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MODEL_FILE: &str = "sentiment_model.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub model_file: PathBuf,
    pub healthcheck_interval: Duration,
    /// Latency above which the probe reports a timeout.
    pub healthcheck_budget: Duration,
    pub maintainer: String,
    pub repository: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let model_file = lookup("MODEL_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_FILE));

        let interval_secs: u64 = parse_or(&lookup, "HEALTHCHECK_INTERVAL_SECS", 30)?;
        let budget_ms: u64 = parse_or(&lookup, "HEALTHCHECK_BUDGET_MS", 2000)?;

        Ok(Self {
            bind_addr,
            model_file,
            healthcheck_interval: Duration::from_secs(interval_secs.max(1)),
            healthcheck_budget: Duration::from_millis(budget_ms),
            maintainer: lookup("APP_MAINTAINER").unwrap_or_else(|| "unknown".to_string()),
            repository: lookup("APP_REPOSITORY").unwrap_or_default(),
        })
    }
}

fn parse_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, raw)),
        None => Ok(default),
    }
}
