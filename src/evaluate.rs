//! Offline evaluation on a labelled file of `__label__N<TAB>text` lines.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::classifier::{MAX_CLASS, MIN_CLASS};
use crate::model::Score;
use crate::service::PredictionService;

const LABEL_PREFIX: &str = "__label__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSentence {
    pub truth: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub total: usize,
    pub accuracy: f64,
    pub macro_f1: f64,
}

pub fn parse_labeled_line(line: &str) -> Result<LabeledSentence> {
    let (label, text) = line
        .split_once('\t')
        .with_context(|| format!("missing tab separator in {:?}", line))?;
    let truth: u8 = label
        .trim()
        .trim_start_matches(LABEL_PREFIX)
        .parse()
        .with_context(|| format!("bad label {:?}", label))?;
    if !(MIN_CLASS..=MAX_CLASS).contains(&truth) {
        bail!("label {} outside {}..={}", truth, MIN_CLASS, MAX_CLASS);
    }
    Ok(LabeledSentence { truth, text: text.to_string() })
}

pub fn read_labeled(path: &Path) -> Result<Vec<LabeledSentence>> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| parse_labeled_line(line).with_context(|| format!("{}:{}", path.display(), n + 1)))
        .collect()
}

pub fn accuracy(truth: &[u8], pred: &[u8]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth.iter().zip(pred).filter(|(t, p)| t == p).count();
    hits as f64 / truth.len() as f64
}

/// Unweighted mean of per-class F1 over every class seen in either slice.
/// A class with no true or predicted positives contributes 0.
pub fn macro_f1(truth: &[u8], pred: &[u8]) -> f64 {
    let mut classes: Vec<u8> = truth.iter().chain(pred).copied().collect();
    classes.sort_unstable();
    classes.dedup();
    if classes.is_empty() {
        return 0.0;
    }

    let total: f64 = classes
        .iter()
        .map(|&class| {
            let mut tp = 0usize;
            let mut fp = 0usize;
            let mut fn_ = 0usize;
            for (&t, &p) in truth.iter().zip(pred) {
                match (t == class, p == class) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }
            let denom = 2 * tp + fp + fn_;
            if denom == 0 {
                0.0
            } else {
                2.0 * tp as f64 / denom as f64
            }
        })
        .sum();
    total / classes.len() as f64
}

/// Cuts compound scores into five equal-width, right-closed bins spanning the
/// observed range and labels them 1..=5. A constant input lands in class 3.
pub fn bin_compound(scores: &[f64]) -> Vec<u8> {
    let (min, max) = scores
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    let bins = (MAX_CLASS - MIN_CLASS + 1) as f64;
    let width = (max - min) / bins;

    scores
        .iter()
        .map(|&s| {
            if width <= 0.0 {
                return (MIN_CLASS + MAX_CLASS) / 2;
            }
            let slot = ((s - min) / width).ceil().max(1.0).min(bins) as u8;
            MIN_CLASS + slot - 1
        })
        .collect()
}

pub fn evaluate(service: &PredictionService, rows: &[LabeledSentence]) -> Result<EvaluationReport> {
    let truth: Vec<u8> = rows.iter().map(|r| r.truth).collect();

    let mut ordinals = Vec::with_capacity(rows.len());
    let mut compounds = Vec::with_capacity(rows.len());
    for row in rows {
        match service.score_sentence(&row.text)? {
            Score::Ordinal(class) => ordinals.push(class),
            Score::Polarity(p) => compounds.push(p.compound),
        }
    }

    let pred = if compounds.is_empty() { ordinals } else { bin_compound(&compounds) };
    let report = EvaluationReport {
        total: rows.len(),
        accuracy: accuracy(&truth, &pred),
        macro_f1: macro_f1(&truth, &pred),
    };
    tracing::info!(total = report.total, accuracy = report.accuracy, macro_f1 = report.macro_f1, "evaluation done");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LogisticPipeline;
    use crate::lexicon::LexiconAnalyzer;
    use crate::model::Model;
    use crate::preprocess::PreprocessingConfig;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_labeled_line() {
        let row = parse_labeled_line("__label__4\tA warm , funny film .").unwrap();
        assert_eq!(row, LabeledSentence { truth: 4, text: "A warm , funny film .".to_string() });

        assert!(parse_labeled_line("__label__4 no tab").is_err());
        assert!(parse_labeled_line("__label__9\tout of range").is_err());
        assert!(parse_labeled_line("label\ttext").is_err());
    }

    #[test]
    fn test_read_labeled_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "__label__1\tawful").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "__label__5\tgreat").unwrap();

        let rows = read_labeled(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].truth, 5);
    }

    #[test]
    fn test_accuracy_and_macro_f1() {
        let truth = [1, 1, 2, 2];
        let pred = [1, 2, 2, 2];
        assert_eq!(accuracy(&truth, &pred), 0.75);
        // class 1: p=1, r=0.5 -> 2/3; class 2: p=2/3, r=1 -> 0.8
        assert!((macro_f1(&truth, &pred) - (2.0 / 3.0 + 0.8) / 2.0).abs() < 1e-9);
        assert_eq!(macro_f1(&[1, 2], &[1, 2]), 1.0);
    }

    #[test]
    fn test_bin_compound() {
        assert_eq!(bin_compound(&[-1.0, -0.5, 0.0, 0.5, 1.0]), vec![1, 2, 3, 4, 5]);
        assert_eq!(bin_compound(&[-1.0, -0.7, 1.0]), vec![1, 1, 5]);
        assert_eq!(bin_compound(&[0.2, 0.2]), vec![3, 3]);
    }

    #[test]
    fn test_evaluate_classifier() {
        let pipeline = LogisticPipeline::new(
            HashMap::from([("great".to_string(), 0), ("awful".to_string(), 1)]),
            vec![1.0, 1.0],
            vec![1, 5],
            vec![vec![3.0, -3.0]],
            vec![0.0],
        )
        .unwrap();
        let service = PredictionService::new(Model::Classifier(pipeline), PreprocessingConfig::all_enabled());
        let rows = vec![
            LabeledSentence { truth: 5, text: "Great!".to_string() },
            LabeledSentence { truth: 1, text: "awful".to_string() },
        ];

        let report = evaluate(&service, &rows).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.macro_f1, 1.0);
    }

    #[test]
    fn test_evaluate_lexicon_bins_scores() {
        let service = PredictionService::new(Model::Lexicon(LexiconAnalyzer::default()), PreprocessingConfig::all_enabled());
        let rows = vec![
            LabeledSentence { truth: 1, text: "I feel bad.".to_string() },
            LabeledSentence { truth: 5, text: "I feel good.".to_string() },
        ];

        let report = evaluate(&service, &rows).unwrap();
        assert_eq!(report.accuracy, 1.0);
    }
}
