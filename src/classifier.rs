//! Bag-of-words logistic regression inference.
//!
//! The pipeline is fitted elsewhere and shipped as weights in the model file:
//! a token vocabulary, inverse document frequencies, one coefficient row per
//! class and the intercepts. Inference turns normalized text into an
//! L2-normalized tf-idf vector and returns the class with the highest
//! decision value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::ModelError;

// Tokens of two or more word characters
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

pub const MIN_CLASS: u8 = 1;
pub const MAX_CLASS: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticPipeline {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    classes: Vec<u8>,
    /// One row per class, or a single row for a two-class model.
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl LogisticPipeline {
    pub fn new(
        vocabulary: HashMap<String, usize>,
        idf: Vec<f64>,
        classes: Vec<u8>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let pipeline = Self { vocabulary, idf, classes, coef, intercept };
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Shape checks run once when the model file is loaded.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.classes.len() < 2 {
            return Err(ModelError::Invalid(format!(
                "expected at least 2 classes, found {}",
                self.classes.len()
            )));
        }
        if let Some(class) = self.classes.iter().find(|c| !(MIN_CLASS..=MAX_CLASS).contains(*c)) {
            return Err(ModelError::Invalid(format!(
                "class {} outside {}..={}",
                class, MIN_CLASS, MAX_CLASS
            )));
        }

        let expected_rows = if self.classes.len() == 2 { 1 } else { self.classes.len() };
        if self.coef.len() != expected_rows || self.intercept.len() != expected_rows {
            return Err(ModelError::ClassMismatch {
                classes: self.classes.len(),
                rows: self.coef.len(),
            });
        }

        let width = self.idf.len();
        if let Some(row) = self.coef.iter().find(|row| row.len() != width) {
            return Err(ModelError::Invalid(format!(
                "coefficient row has {} features, vocabulary has {}",
                row.len(),
                width
            )));
        }
        if let Some(&index) = self.vocabulary.values().find(|&&index| index >= width) {
            return Err(ModelError::FeatureOutOfRange { index, width });
        }

        Ok(())
    }

    pub fn predict(&self, text: &str) -> Result<u8, ModelError> {
        let features = self.features(text)?;

        let decisions: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| {
                let dot: f64 = features
                    .iter()
                    .map(|&(index, weight)| row.get(index).copied().unwrap_or(0.0) * weight)
                    .sum();
                dot + bias
            })
            .collect();

        let best = if let &[decision] = decisions.as_slice() {
            usize::from(decision > 0.0)
        } else {
            decisions
                .iter()
                .enumerate()
                .fold(None, |best: Option<(usize, f64)>, (i, &d)| match best {
                    Some((_, top)) if top >= d => best,
                    _ => Some((i, d)),
                })
                .map(|(i, _)| i)
                .ok_or(ModelError::ClassMismatch { classes: self.classes.len(), rows: 0 })?
        };

        self.classes
            .get(best)
            .copied()
            .ok_or(ModelError::ClassMismatch { classes: self.classes.len(), rows: self.coef.len() })
    }

    /// Sparse tf-idf vector, L2-normalized, ordered by feature index.
    fn features(&self, text: &str) -> Result<Vec<(usize, f64)>, ModelError> {
        let width = self.idf.len();
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();

        for token in TOKEN.find_iter(&text.to_lowercase()) {
            if let Some(&index) = self.vocabulary.get(token.as_str()) {
                if index >= width {
                    return Err(ModelError::FeatureOutOfRange { index, width });
                }
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut weighted: Vec<(usize, f64)> =
            counts.into_iter().map(|(index, tf)| (index, tf * self.idf[index])).collect();

        let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in weighted.iter_mut() {
                *w /= norm;
            }
        }

        Ok(weighted)
    }
}
