//! Parsed model output.

use crate::error::SignatureError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Output values of one call, keyed by output field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Prediction {
    fields: Map<String, Value>,
}

impl Prediction {
    /// Wrap parsed output values.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Value of an output field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Value of a string output field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Items of a `list[str]` output field; empty when absent.
    pub fn get_str_list(&self, field: &str) -> Vec<String> {
        self.fields
            .get(field)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deserialize every output field into a struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, SignatureError> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    /// The underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn prediction() -> Prediction {
        Prediction::new(
            json!({"answer": "42", "follow_up_questions": ["a", "b"]})
                .as_object()
                .cloned()
                .unwrap(),
        )
    }

    #[test]
    fn accessors() {
        let p = prediction();
        assert_eq!(p.get_str("answer"), Some("42"));
        assert_eq!(p.get_str_list("follow_up_questions"), vec!["a", "b"]);
        assert!(p.get_str_list("missing").is_empty());
        assert!(p.get("missing").is_none());
    }

    #[test]
    fn deserialize_into_struct() {
        #[derive(Deserialize)]
        struct Out {
            answer: String,
            follow_up_questions: Vec<String>,
        }
        let out: Out = prediction().deserialize().unwrap();
        assert_eq!(out.answer, "42");
        assert_eq!(out.follow_up_questions.len(), 2);
    }

    #[test]
    fn deserialize_reports_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Out {
            answer: u32,
        }
        let err = prediction().deserialize::<Out>().unwrap_err();
        assert!(matches!(err, SignatureError::Conversion(_)));
    }
}
