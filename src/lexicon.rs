//! Lexicon-based sentiment intensity scoring.
//!
//! Each word found in the lexicon contributes its valence (roughly -4 to +4),
//! adjusted by preceding intensifiers and negations. The summed valence is
//! squashed into a compound score in [-1, 1]; the positive, negative and
//! neutral shares are proportions of the sentence and sum to 1.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

// Normalization constant for the compound score
const ALPHA: f64 = 15.0;
// Valence multiplier when a negation precedes a lexicon word
const NEGATION_SCALAR: f64 = -0.74;
// Intensifier step
const BOOSTER_STEP: f64 = 0.293;
// How far back negations and boosters reach, and how they decay with distance
const LOOKBACK_DECAY: [f64; 3] = [1.0, 0.95, 0.9];

static DEFAULT_LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    vec![
        // positive
        ("good", 1.9), ("great", 3.1), ("love", 3.2), ("loved", 2.9), ("loving", 2.9),
        ("excellent", 2.7), ("amazing", 2.8), ("wonderful", 2.7), ("fantastic", 2.6),
        ("awesome", 3.1), ("best", 3.2), ("better", 1.9), ("happy", 2.7), ("joy", 2.8),
        ("beautiful", 2.9), ("perfect", 2.7), ("nice", 1.8), ("fun", 2.3), ("glad", 2.0),
        ("pleasant", 2.3), ("brilliant", 2.8), ("superb", 3.1), ("outstanding", 3.0),
        ("delightful", 2.9), ("enjoy", 2.2), ("enjoyed", 2.3), ("thanks", 1.9),
        ("recommend", 1.5), ("impressive", 2.3), ("helpful", 1.8), ("win", 2.8),
        ("success", 2.7), ("successful", 2.8), ("rewarding", 2.4), ("thoughtful", 1.6),
        ("powerful", 1.8), ("fine", 0.8), ("okay", 0.9), ("ok", 1.2), ("cool", 1.3),
        ("satisfied", 1.8), ("pleased", 1.9), ("charming", 2.4), ("funny", 1.9),
        ("masterpiece", 3.1), ("moving", 1.2), ("smart", 1.7), ("fresh", 1.3),
        // negative
        ("bad", -2.5), ("terrible", -2.1), ("awful", -2.0), ("horrible", -2.5),
        ("hate", -2.7), ("hated", -3.2), ("worst", -3.1), ("worse", -2.1), ("poor", -2.1),
        ("sad", -2.1), ("angry", -2.3), ("disappointing", -2.2), ("disappointed", -1.9),
        ("boring", -1.3), ("ugly", -2.3), ("stupid", -2.4), ("useless", -1.8),
        ("waste", -1.8), ("fail", -2.5), ("failed", -2.3), ("failure", -2.3),
        ("broken", -1.8), ("annoying", -1.9), ("problem", -1.7), ("wrong", -2.1),
        ("dull", -1.7), ("mess", -1.5), ("pain", -2.3), ("hurt", -2.4), ("sick", -2.3),
        ("cry", -2.1), ("lame", -1.8), ("mediocre", -1.0), ("tedious", -1.6),
        ("pathetic", -2.5), ("garbage", -2.2), ("trash", -1.8), ("unpleasant", -2.2),
    ]
    .into_iter()
    .map(|(word, valence)| (word.to_string(), valence))
    .collect()
});

static NEGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere",
        "cannot", "cant", "dont", "doesnt", "didnt", "isnt", "wasnt", "werent", "wont",
        "wouldnt", "shouldnt", "couldnt", "aint", "without",
    ]
    .into_iter()
    .collect()
});

static BOOSTERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let increments = [
        "very", "really", "extremely", "absolutely", "completely", "totally", "incredibly",
        "especially", "highly", "super", "truly", "so", "most", "more",
    ];
    let decrements = [
        "slightly", "somewhat", "barely", "hardly", "little", "kinda", "almost", "partly",
        "marginally", "less",
    ];
    increments
        .into_iter()
        .map(|w| (w, BOOSTER_STEP))
        .chain(decrements.into_iter().map(|w| (w, -BOOSTER_STEP)))
        .collect()
});

/// Polarity shares and compound score of one sentence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PolarityScores {
    /// Negative share, 0 to 1
    #[schema(example = 0.0)]
    pub neg: f64,
    /// Neutral share, 0 to 1
    #[schema(example = 0.256)]
    pub neu: f64,
    /// Positive share, 0 to 1
    #[schema(example = 0.744)]
    pub pos: f64,
    /// Normalized sum of valences, -1 to 1
    #[schema(example = 0.4404)]
    pub compound: f64,
}

impl PolarityScores {
    /// Scores of text with no words at all.
    pub fn neutral() -> Self {
        Self { neg: 0.0, neu: 1.0, pos: 0.0, compound: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconAnalyzer {
    lexicon: HashMap<String, f64>,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self { lexicon: DEFAULT_LEXICON.clone() }
    }
}

impl LexiconAnalyzer {
    pub fn new(lexicon: HashMap<String, f64>) -> Self {
        Self { lexicon }
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }

    pub fn polarity_scores(&self, text: &str) -> PolarityScores {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| c.is_ascii_punctuation()).to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        if words.is_empty() {
            return PolarityScores::neutral();
        }

        let sentiments: Vec<f64> = (0..words.len()).map(|i| self.valence_at(&words, i)).collect();

        let sum: f64 = sentiments.iter().sum();
        let compound = (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0);

        // Lexicon words count one extra so that they outweigh a neutral word.
        let mut pos_sum = 0.0;
        let mut neg_sum = 0.0;
        let mut neu_count = 0.0;
        for &s in &sentiments {
            if s > 0.0 {
                pos_sum += s + 1.0;
            } else if s < 0.0 {
                neg_sum += s - 1.0;
            } else {
                neu_count += 1.0;
            }
        }

        let total = pos_sum + neg_sum.abs() + neu_count;

        PolarityScores {
            neg: round_to(neg_sum.abs() / total, 3),
            neu: round_to(neu_count / total, 3),
            pos: round_to(pos_sum / total, 3),
            compound: round_to(compound, 4),
        }
    }

    fn valence_at(&self, words: &[String], i: usize) -> f64 {
        let Some(&base) = self.lexicon.get(&words[i]) else {
            return 0.0;
        };

        let mut valence = base;
        let mut negated = false;

        for (distance, decay) in LOOKBACK_DECAY.iter().enumerate() {
            let Some(prev) = i.checked_sub(distance + 1) else {
                break;
            };
            let prev = words[prev].as_str();

            if let Some(&step) = BOOSTERS.get(prev) {
                let step = if base < 0.0 { -step } else { step };
                valence += step * decay;
            }
            if NEGATIONS.contains(prev) || prev.ends_with("n't") {
                negated = true;
            }
        }

        if negated {
            valence *= NEGATION_SCALAR;
        }
        valence
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> PolarityScores {
        LexiconAnalyzer::default().polarity_scores(text)
    }

    #[test]
    fn test_positive_sentence() {
        assert_eq!(score("feel good"), PolarityScores { neg: 0.0, neu: 0.256, pos: 0.744, compound: 0.4404 });
    }

    #[test]
    fn test_negative_sentence() {
        assert_eq!(score("feel bad"), PolarityScores { neg: 0.778, neu: 0.222, pos: 0.0, compound: -0.5423 });
    }

    #[test]
    fn test_longer_sentence() {
        let scores = score("id love three cups latte caffe");
        assert_eq!(scores, PolarityScores { neg: 0.0, neu: 0.543, pos: 0.457, compound: 0.6369 });
    }

    #[test]
    fn test_shares_sum_to_one() {
        for text in ["good bad ugly nice", "the item arrived on time", "terrible", "great"] {
            let s = score(text);
            assert!((s.pos + s.neg + s.neu - 1.0).abs() < 0.01, "{text}: {s:?}");
            assert!((-1.0..=1.0).contains(&s.compound));
        }
    }

    #[test]
    fn test_empty_text_is_neutral() {
        assert_eq!(score(""), PolarityScores::neutral());
        assert_eq!(score(" ... "), PolarityScores::neutral());
    }

    #[test]
    fn test_negation_flips_polarity() {
        assert!(score("not good").compound < 0.0);
        assert!(score("isn't bad").compound > 0.0);
    }

    #[test]
    fn test_booster_intensifies() {
        assert!(score("very good").compound > score("good").compound);
        assert!(score("very bad").compound < score("bad").compound);
        assert!(score("slightly good").compound < score("good").compound);
    }

    #[test]
    fn test_custom_lexicon() {
        let analyzer = LexiconAnalyzer::new(HashMap::from([("rust".to_string(), 2.0)]));
        assert!(analyzer.polarity_scores("rust").compound > 0.0);
        assert_eq!(analyzer.polarity_scores("good").compound, 0.0);
    }
}
