//! Duplicate-key aware decoding of JSON request bodies.
//!
//! `serde_json::Map` keeps only the last value of a repeated key. The request
//! validator needs every occurrence, so the body is decoded through a map
//! visitor that records each `(key, value)` pair in document order.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use std::fmt;

use crate::error::ApiError;

/// Top-level members of a JSON object, duplicates included, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayload {
    pairs: Vec<(String, Value)>,
}

/// All values seen for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedField {
    Single(Value),
    /// The key appeared two or more times.
    Repeated(Vec<Value>),
}

impl NormalizedField {
    fn push(&mut self, value: Value) {
        match self {
            NormalizedField::Single(first) => {
                let first = std::mem::replace(first, Value::Null);
                *self = NormalizedField::Repeated(vec![first, value]);
            }
            NormalizedField::Repeated(values) => values.push(value),
        }
    }
}

impl RawPayload {
    /// Decodes a JSON object body. Anything else (arrays, scalars, broken
    /// syntax) is a decode error.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn pairs(&self) -> &[(String, Value)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Groups values by key, keyed in order of first appearance.
    pub fn grouped(&self) -> Vec<(&str, NormalizedField)> {
        let mut fields: Vec<(&str, NormalizedField)> = Vec::new();

        for (key, value) in &self.pairs {
            match fields.iter_mut().find(|(k, _)| *k == key.as_str()) {
                Some((_, field)) => field.push(value.clone()),
                None => fields.push((key.as_str(), NormalizedField::Single(value.clone()))),
            }
        }

        fields
    }
}

struct PairsVisitor;

impl<'de> Visitor<'de> for PairsVisitor {
    type Value = RawPayload;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(1));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            pairs.push((key, value));
        }
        Ok(RawPayload { pairs })
    }
}

impl<'de> Deserialize<'de> for RawPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PairsVisitor)
    }
}

#[async_trait]
impl<S> FromRequest<S> for RawPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Decode(e.body_text()))?;

        RawPayload::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(body: &str) -> RawPayload {
        RawPayload::from_slice(body.as_bytes()).unwrap()
    }

    #[test]
    fn test_duplicates_are_preserved_in_order() {
        let payload = decode(r#"{"sentence": "a", "other": 1, "sentence": "b"}"#);
        assert_eq!(
            payload.pairs(),
            &[
                ("sentence".to_string(), json!("a")),
                ("other".to_string(), json!(1)),
                ("sentence".to_string(), json!("b")),
            ]
        );
    }

    #[test]
    fn test_grouping_keeps_first_appearance_order() {
        let payload = decode(r#"{"b": 1, "a": 2, "b": 3, "b": 4}"#);
        let grouped = payload.grouped();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0], ("b", NormalizedField::Repeated(vec![json!(1), json!(3), json!(4)])));
        assert_eq!(grouped[1], ("a", NormalizedField::Single(json!(2))));
    }

    #[test]
    fn test_list_literal_is_a_single_value() {
        let payload = decode(r#"{"sentence": ["a", "b"]}"#);
        let grouped = payload.grouped();
        assert_eq!(grouped, vec![("sentence", NormalizedField::Single(json!(["a", "b"])))]);
    }

    #[test]
    fn test_empty_object() {
        assert!(decode("{}").is_empty());
        assert!(decode("{}").grouped().is_empty());
    }

    #[test]
    fn test_non_objects_are_rejected() {
        for body in ["[]", "\"sentence\"", "null", "{sentence: \"x\"}", r#"{"sentence": value}"#, ""] {
            assert!(RawPayload::from_slice(body.as_bytes()).is_err(), "body: {body:?}");
        }
    }
}
