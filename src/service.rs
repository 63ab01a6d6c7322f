//! Request handling independent of the HTTP layer.

use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::{Model, ModelError, ModelFile, Score};
use crate::payload::RawPayload;
use crate::preprocess::{normalize, PreprocessingConfig};
use crate::validator::validate;

/// Successful `/curl` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionResponse {
    /// Polarity shares (lexicon model) or `{"score": "1".."5"}` (classifier)
    #[schema(value_type = Object, example = json!({"neg": 0.0, "neu": 0.256, "pos": 0.744, "compound": 0.4404}))]
    pub score: Score,
    #[schema(example = "complete")]
    pub status: String,
    /// The sentence exactly as submitted
    #[schema(example = "I feel good.")]
    pub sentence: String,
}

/// Validates, normalizes and scores sentences with one fixed model.
#[derive(Debug, Clone)]
pub struct PredictionService {
    model: Arc<Model>,
    preprocessing: PreprocessingConfig,
}

impl PredictionService {
    pub fn new(model: Model, preprocessing: PreprocessingConfig) -> Self {
        Self { model: Arc::new(model), preprocessing }
    }

    /// Serves the model with the preprocessing it was trained with.
    pub fn from_file(file: ModelFile) -> Self {
        Self::new(file.model, file.preprocessing)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn preprocessing(&self) -> &PreprocessingConfig {
        &self.preprocessing
    }

    pub fn handle(&self, payload: &RawPayload) -> Result<PredictionResponse, ApiError> {
        let sentence = validate(payload)?;
        let score = self.score_sentence(&sentence)?;

        Ok(PredictionResponse {
            score,
            status: "complete".to_string(),
            sentence,
        })
    }

    /// Normalizes and scores without request validation.
    pub fn score_sentence(&self, sentence: &str) -> Result<Score, ModelError> {
        let normalized = normalize(sentence, &self.preprocessing);
        tracing::debug!(%sentence, %normalized, "scoring");
        self.model.predict(&normalized)
    }
}
