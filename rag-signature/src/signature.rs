//! The signature type.

use crate::error::SignatureError;
use crate::field::{FieldKind, FieldSpec};
use serde_json::Value;

/// Input values keyed by field name.
pub type Inputs = serde_json::Map<String, Value>;

/// Typed input/output schema of one model call.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Identifier, used in errors and listings.
    pub name: String,
    /// The task statement given to the model.
    pub instructions: String,
    /// Input fields, in prompt order.
    pub inputs: Vec<FieldSpec>,
    /// Output fields, in the order the model should produce them.
    pub outputs: Vec<FieldSpec>,
}

impl Signature {
    /// An empty signature.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the task statement.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Append an input field.
    pub fn input(mut self, field: FieldSpec) -> Self {
        self.inputs.push(field);
        self
    }

    /// Append an output field.
    pub fn output(mut self, field: FieldSpec) -> Self {
        self.outputs.push(field);
        self
    }

    /// Look up an output field.
    pub fn output_field(&self, name: &str) -> Option<&FieldSpec> {
        self.outputs.iter().find(|f| f.name == name)
    }

    /// Ensure every input field is present with a value of its kind.
    ///
    /// Extra keys are ignored.
    pub fn check_inputs(&self, inputs: &Inputs) -> Result<(), SignatureError> {
        for field in &self.inputs {
            let value = inputs
                .get(&field.name)
                .ok_or_else(|| SignatureError::MissingInput {
                    signature: self.name.clone(),
                    field: field.name.clone(),
                })?;
            if !field.kind.accepts(value) {
                return Err(SignatureError::InvalidInput {
                    field: field.name.clone(),
                    expected: field.kind.type_name(),
                });
            }
        }
        Ok(())
    }
}

/// Render an input value for the prompt: strings verbatim, the rest as JSON.
pub(crate) fn render_value(kind: &FieldKind, value: &Value) -> String {
    match (kind, value) {
        (_, Value::String(s)) => s.clone(),
        (FieldKind::List(_), Value::Array(items)) if items.is_empty() => "[]".into(),
        _ => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn qa() -> Signature {
        Signature::new("qa")
            .instructions("Answer the question.")
            .input(FieldSpec::new("question", FieldKind::Str))
            .input(FieldSpec::new("history", FieldKind::str_list()))
            .output(FieldSpec::new("answer", FieldKind::Str))
    }

    fn inputs(value: Value) -> Inputs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn builder_keeps_field_order() {
        let sig = qa();
        assert_eq!(sig.inputs[0].name, "question");
        assert_eq!(sig.inputs[1].name, "history");
        assert!(sig.output_field("answer").is_some());
        assert!(sig.output_field("question").is_none());
    }

    #[test]
    fn check_inputs_accepts_complete_inputs() {
        let sig = qa();
        let ok = inputs(json!({"question": "why?", "history": [], "extra": 1}));
        assert!(sig.check_inputs(&ok).is_ok());
    }

    #[test]
    fn check_inputs_reports_missing_field() {
        let err = qa()
            .check_inputs(&inputs(json!({"question": "why?"})))
            .unwrap_err();
        assert!(matches!(err, SignatureError::MissingInput { ref field, .. } if field == "history"));
    }

    #[test]
    fn check_inputs_reports_wrong_kind() {
        let err = qa()
            .check_inputs(&inputs(json!({"question": 3, "history": []})))
            .unwrap_err();
        assert!(matches!(err, SignatureError::InvalidInput { ref expected, .. } if expected == "str"));
    }

    #[test]
    fn render_values() {
        assert_eq!(render_value(&FieldKind::Str, &json!("plain")), "plain");
        assert_eq!(render_value(&FieldKind::str_list(), &json!([])), "[]");
        assert_eq!(
            render_value(&FieldKind::str_list(), &json!(["a"])),
            "[\n  \"a\"\n]"
        );
    }
}
