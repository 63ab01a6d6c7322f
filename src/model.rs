//! The scoring model and its on-disk file.

use anyhow::{Context, Result};
use chrono::Local;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classifier::{LogisticPipeline, MAX_CLASS};
use crate::lexicon::{LexiconAnalyzer, PolarityScores};
use crate::preprocess::PreprocessingConfig;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("feature index {index} out of range for {width} features")]
    FeatureOutOfRange { index: usize, width: usize },

    #[error("{classes} classes do not match {rows} coefficient rows")]
    ClassMismatch { classes: usize, rows: usize },
}

/// A loaded sentiment model.
///
/// Inference takes `&self` and touches no interior state, so one instance is
/// shared by all request tasks behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    Lexicon(LexiconAnalyzer),
    Classifier(LogisticPipeline),
}

impl Model {
    /// Scores text that has already been through preprocessing.
    pub fn predict(&self, normalized: &str) -> Result<Score, ModelError> {
        match self {
            Model::Lexicon(analyzer) => Ok(Score::Polarity(analyzer.polarity_scores(normalized))),
            Model::Classifier(pipeline) => pipeline.predict(normalized).map(Score::Ordinal),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Model::Lexicon(_) => Ok(()),
            Model::Classifier(pipeline) => pipeline.validate(),
        }
    }

    pub fn model_type(&self) -> &'static str {
        match self {
            Model::Lexicon(_) => "LexiconAnalyzer",
            Model::Classifier(_) => "LogisticPipeline",
        }
    }

    /// Human-readable name shown in the form UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Model::Lexicon(_) => "Sentiment Intensity Analyzer",
            Model::Classifier(_) => "Logistic Regressor",
        }
    }
}

/// Model output. Serializes as the `score` object of a prediction response:
/// the four polarity fields, or `{"score": "<class>"}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Polarity(PolarityScores),
    Ordinal(u8),
}

impl Score {
    pub fn is_positive(&self) -> bool {
        match self {
            Score::Polarity(p) => p.compound > 0.0,
            Score::Ordinal(class) => *class == MAX_CLASS,
        }
    }
}

impl Serialize for Score {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Score::Polarity(p) => p.serialize(serializer),
            Score::Ordinal(class) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("score", &class.to_string())?;
                map.end()
            }
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Polarity(p) => write!(
                f,
                "Positive: {:?}  |  Negative: {:?}  |  Neutral: {:?}  |  Compound: {:?}",
                p.pos, p.neg, p.neu, p.compound
            ),
            Score::Ordinal(class) => write!(f, "Score: {}", class),
        }
    }
}

/// Whether the file was written after training or while serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Train,
    Pred,
}

/// Everything persisted for a model, including the preprocessing it was
/// trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub model: Model,
    pub model_type: String,
    pub model_name: String,
    pub version: String,
    #[serde(rename = "train/pred")]
    pub stage: Stage,
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
}

impl ModelFile {
    pub fn new(model: Model, model_name: impl Into<String>, stage: Stage, preprocessing: PreprocessingConfig) -> Self {
        Self {
            model_type: model.model_type().to_string(),
            model,
            model_name: model_name.into(),
            version: Local::now().format("%Y%m%d-%H%M%S").to_string(),
            stage,
            preprocessing,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model file {}", path.display()))?;
        let file: ModelFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse model file {}", path.display()))?;
        file.model
            .validate()
            .with_context(|| format!("model file {} holds an unusable model", path.display()))?;

        tracing::info!(
            path = %path.display(),
            model_type = %file.model_type,
            model_name = %file.model_name,
            version = %file.version,
            "model file loaded"
        );
        Ok(file)
    }

    /// Writes the file twice: a timestamped copy and `path` itself.
    /// Returns the timestamped path.
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(self)?;
        let stamped = timestamped_path(path, &Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());

        for target in [&stamped, &path.to_path_buf()] {
            std::fs::write(target, &json)
                .with_context(|| format!("failed to write model file {}", target.display()))?;
            tracing::info!(path = %target.display(), "model file saved");
        }

        Ok(stamped)
    }
}

fn timestamped_path(path: &Path, stamp: &str) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_@{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}_@{}", stem, stamp),
    };
    path.with_file_name(name)
}
