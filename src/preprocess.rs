//! Text preprocessing shared by model training, evaluation and serving.
//!
//! Every path that feeds text to a model goes through [`normalize`] with the
//! [`PreprocessingConfig`] stored in the model file, so the text a model sees
//! at serving time is produced exactly the way its training text was.

use deunicode::deunicode_with_tofu;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

// Unicode decimal digits (`\d` is Nd in the regex crate)
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

// English stop words: the NLTK list without "there", so "hi there" survives.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
        "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
        "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
        "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "this", "that", "that'll", "these", "those", "am", "is", "are",
        "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
        "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or", "because",
        "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
        "between", "into", "through", "during", "before", "after", "above", "below",
        "to", "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
        "further", "then", "once", "here", "when", "where", "why", "how", "all", "any",
        "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor",
        "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
        "will", "just", "don", "don't", "should", "should've", "now", "d", "ll", "m",
        "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
        "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven",
        "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't",
        "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn", "wasn't",
        "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
    ]
    .into_iter()
    .collect()
});

// Elements whose text never renders
const INVISIBLE_ELEMENTS: [&str; 4] = ["script", "style", "template", "noscript"];

/// The seven preprocessing toggles.
///
/// Stored alongside the model it was trained with. Fields missing from a
/// model file default to enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Fold letters to lower case
    pub lower_case: bool,
    /// Remove decimal digits
    pub strip_digits: bool,
    /// Replace markup with its visible text
    pub strip_html: bool,
    /// Trim leading and trailing whitespace
    pub strip_whitespace: bool,
    /// Remove ASCII punctuation
    pub strip_punctuation: bool,
    /// Drop English stop words
    pub strip_stop_words: bool,
    /// Transliterate accented characters to ASCII
    pub fold_accents: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl PreprocessingConfig {
    pub const fn all_enabled() -> Self {
        Self {
            lower_case: true,
            strip_digits: true,
            strip_html: true,
            strip_whitespace: true,
            strip_punctuation: true,
            strip_stop_words: true,
            fold_accents: true,
        }
    }

    pub const fn all_disabled() -> Self {
        Self {
            lower_case: false,
            strip_digits: false,
            strip_html: false,
            strip_whitespace: false,
            strip_punctuation: false,
            strip_stop_words: false,
            fold_accents: false,
        }
    }
}

/// Runs the enabled stages over `text` in their fixed order.
pub fn normalize(text: &str, config: &PreprocessingConfig) -> String {
    let mut text = text.to_string();

    if config.lower_case {
        text = text.to_lowercase();
    }
    if config.strip_digits {
        text = strip_digits(&text);
    }
    if config.strip_html {
        text = strip_html(&text);
    }
    if config.strip_whitespace {
        text = text.trim().to_string();
    }
    if config.strip_punctuation {
        text = strip_punctuation(&text);
    }
    if config.strip_stop_words {
        text = strip_stop_words(&text);
    }
    if config.fold_accents {
        text = fold_accents(&text);
    }

    text
}

pub fn strip_digits(text: &str) -> String {
    DIGITS.replace_all(text, "").into_owned()
}

/// Visible text nodes of `text`, joined with a single space.
pub fn strip_html(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    let mut pieces: Vec<&str> = Vec::new();

    for node in fragment.tree.root().descendants() {
        let Node::Text(content) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            pieces.push(content);
        }
    }

    pieces.join(" ")
}

pub fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

pub fn strip_stop_words(text: &str) -> String {
    text.split_whitespace()
        .filter(|token| !is_stop_word(token))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Closest ASCII rendering; characters with no transliteration are dropped.
pub fn fold_accents(text: &str) -> String {
    deunicode_with_tofu(text, "")
}
