//! Single-key request validation.
//!
//! A request body must be a JSON object with exactly one member, keyed
//! `sentence`, whose value is a string containing at least one ASCII letter.
//! Checks run in a fixed priority order and the first failing check decides
//! the error, so every payload maps to exactly one outcome.

use serde_json::Value;
use thiserror::Error;

use crate::payload::{NormalizedField, RawPayload};

pub const SENTENCE_KEY: &str = "sentence";

/// Why a payload was rejected. Client errors only: each maps to HTTP 400.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Failed to decode JSON object: No key/value pair in JSON. Expecting one, with key of 'sentence'.")]
    NoPair,

    #[error("Failed to decode JSON object: More than one key/value pair in JSON. Expecting only one, with key of 'sentence'.")]
    MultipleKeys,

    #[error("Failed to decode JSON object: Repeated key/value pairs in JSON. Expecting only one, with key of 'sentence'.")]
    RepeatedPair,

    #[error("Failed to decode JSON object: More than one value for one key in JSON. Expecting only one, with key of 'sentence'.")]
    MultiValue,

    #[error("Failed to decode JSON object: Expecting key/value pair with key of 'sentence'.")]
    WrongKey,

    #[error("Failed to decode JSON object: Expecting str data type for value in key/value pair (enclosed in double quotes).")]
    WrongType,

    #[error("Failed to find English letter in the input sentence. Please try again.")]
    NoLetters,
}

/// `Ok(sentence)` is the accepted case; the sentence is returned untouched.
pub type ValidationOutcome = Result<String, ValidationError>;

pub fn validate(payload: &RawPayload) -> ValidationOutcome {
    let mut fields = payload.grouped();

    let (key, field) = match fields.len() {
        0 => return Err(ValidationError::NoPair),
        1 => fields.remove(0),
        _ => return Err(ValidationError::MultipleKeys),
    };

    let value = match field {
        NormalizedField::Repeated(values) => {
            return Err(if all_equal(&values) {
                ValidationError::RepeatedPair
            } else {
                ValidationError::MultiValue
            });
        }
        NormalizedField::Single(value) => value,
    };

    if key != SENTENCE_KEY {
        return Err(ValidationError::WrongKey);
    }

    let Value::String(sentence) = value else {
        return Err(ValidationError::WrongType);
    };

    if !has_ascii_letter(&sentence) {
        return Err(ValidationError::NoLetters);
    }

    Ok(sentence)
}

pub fn has_ascii_letter(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic())
}

// Numbers compare by value, so 1 and 1.0 are the same.
fn all_equal(values: &[Value]) -> bool {
    values.windows(2).all(|pair| match (&pair[0], &pair[1]) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (a, b) => a == b,
    })
}
