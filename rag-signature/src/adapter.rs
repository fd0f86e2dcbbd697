//! Prompt adapters: signature + inputs to messages, completion to prediction.
//!
//! [`ChatAdapter`] asks for each output under a `[[ ## field ## ]]` marker.
//! [`JsonAdapter`] asks for one JSON object and is the fallback when a model
//! ignores the marker structure.

use crate::error::SignatureError;
use crate::field::FieldSpec;
use crate::prediction::Prediction;
use crate::signature::{render_value, Inputs, Signature};
use rag_turn::ProviderMessage;
use serde_json::{Map, Value};
use std::fmt::Write as _;

const COMPLETED: &str = "completed";

/// Turns a signature into a prompt and a completion into a prediction.
pub trait Adapter: Send + Sync {
    /// Short name, for logs.
    fn name(&self) -> &'static str;

    /// Build the system and user messages for one call.
    fn format(&self, signature: &Signature, inputs: &Inputs) -> Vec<ProviderMessage>;

    /// Parse a completion into values for every output field.
    fn parse(&self, signature: &Signature, completion: &str) -> Result<Prediction, SignatureError>;
}

fn marker(name: &str) -> String {
    format!("[[ ## {name} ## ]]")
}

fn describe_fields(out: &mut String, heading: &str, fields: &[FieldSpec]) {
    let _ = writeln!(out, "{heading}");
    for (i, field) in fields.iter().enumerate() {
        let _ = write!(out, "{}. `{}` ({})", i + 1, field.name, field.kind.type_name());
        if !field.description.is_empty() {
            let _ = write!(out, ": {}", field.description);
        }
        out.push('\n');
    }
}

fn field_descriptions(signature: &Signature) -> String {
    let mut out = String::new();
    describe_fields(&mut out, "Your input fields are:", &signature.inputs);
    describe_fields(&mut out, "Your output fields are:", &signature.outputs);
    out
}

fn objective(signature: &Signature) -> String {
    let instructions = if signature.instructions.is_empty() {
        let inputs: Vec<String> = signature.inputs.iter().map(|f| format!("`{}`", f.name)).collect();
        let outputs: Vec<String> = signature.outputs.iter().map(|f| format!("`{}`", f.name)).collect();
        format!(
            "Given the fields {}, produce the fields {}.",
            inputs.join(", "),
            outputs.join(", ")
        )
    } else {
        signature.instructions.clone()
    };
    format!("In adhering to this structure, your objective is: {instructions}")
}

fn render_inputs(signature: &Signature, inputs: &Inputs) -> String {
    let mut out = String::new();
    for field in &signature.inputs {
        let value = inputs
            .get(&field.name)
            .map(|v| render_value(&field.kind, v))
            .unwrap_or_default();
        let _ = writeln!(out, "{}\n{}\n", marker(&field.name), value);
    }
    out
}

fn output_placeholder(field: &FieldSpec) -> String {
    match field.kind {
        crate::field::FieldKind::Str => format!("{{{}}}", field.name),
        ref kind => format!(
            "{{{}}}        # note: the value you produce must be valid JSON of type {}",
            field.name,
            kind.type_name()
        ),
    }
}

/// Marker-delimited prompt format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatAdapter;

impl ChatAdapter {
    /// Split a completion into `(field, text)` sections by marker lines.
    fn sections(completion: &str) -> Vec<(String, String)> {
        let mut sections: Vec<(String, String)> = Vec::new();
        for line in completion.lines() {
            let trimmed = line.trim();
            let header = trimmed
                .strip_prefix("[[ ## ")
                .and_then(|rest| rest.split_once(" ## ]]"));
            match header {
                Some((name, tail)) => {
                    let mut body = String::new();
                    if !tail.trim().is_empty() {
                        body.push_str(tail.trim());
                        body.push('\n');
                    }
                    sections.push((name.trim().to_string(), body));
                }
                None => {
                    if let Some((_, body)) = sections.last_mut() {
                        body.push_str(line);
                        body.push('\n');
                    }
                }
            }
        }
        sections
    }
}

impl Adapter for ChatAdapter {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn format(&self, signature: &Signature, inputs: &Inputs) -> Vec<ProviderMessage> {
        let mut system = field_descriptions(signature);
        system.push_str(
            "\nAll interactions will be structured in the following way, \
             with the appropriate values filled in.\n\n",
        );
        for field in &signature.inputs {
            let _ = writeln!(system, "{}\n{{{}}}\n", marker(&field.name), field.name);
        }
        for field in &signature.outputs {
            let _ = writeln!(system, "{}\n{}\n", marker(&field.name), output_placeholder(field));
        }
        let _ = writeln!(system, "{}", marker(COMPLETED));
        system.push_str(&objective(signature));

        let mut user = render_inputs(signature, inputs);
        let order: Vec<String> = signature.outputs.iter().map(|f| format!("`{}`", marker(&f.name))).collect();
        let _ = write!(
            user,
            "Respond with the corresponding output fields, starting with the field {}, \
             and then ending with the marker for `{}`.",
            order.join(", then "),
            marker(COMPLETED)
        );

        vec![ProviderMessage::system(system), ProviderMessage::user(user)]
    }

    fn parse(&self, signature: &Signature, completion: &str) -> Result<Prediction, SignatureError> {
        let sections = Self::sections(completion);
        let matched = sections
            .iter()
            .any(|(name, _)| signature.output_field(name).is_some());
        if !matched {
            return Err(SignatureError::Unparseable(format!(
                "no output markers for {} found",
                signature.name
            )));
        }

        let mut fields = Map::new();
        for field in &signature.outputs {
            // First occurrence wins; models sometimes repeat the structure.
            let section = sections.iter().find(|(name, _)| *name == field.name);
            let value = match section {
                Some((_, text)) => {
                    field
                        .kind
                        .coerce(text)
                        .map_err(|reason| SignatureError::InvalidOutput {
                            field: field.name.clone(),
                            reason,
                        })?
                }
                None => missing(field)?,
            };
            fields.insert(field.name.clone(), value);
        }
        Ok(Prediction::new(fields))
    }
}

/// Single-JSON-object prompt format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAdapter;

impl JsonAdapter {
    fn extract_object(completion: &str) -> Result<Map<String, Value>, SignatureError> {
        let start = completion.find('{');
        let end = completion.rfind('}');
        let (Some(start), Some(end)) = (start, end) else {
            return Err(SignatureError::Unparseable("no JSON object found".into()));
        };
        if end < start {
            return Err(SignatureError::Unparseable("no JSON object found".into()));
        }
        match serde_json::from_str::<Value>(&completion[start..=end]) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(SignatureError::Unparseable("expected a JSON object".into())),
            Err(e) => Err(SignatureError::Unparseable(e.to_string())),
        }
    }
}

impl Adapter for JsonAdapter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn format(&self, signature: &Signature, inputs: &Inputs) -> Vec<ProviderMessage> {
        let mut system = field_descriptions(signature);
        system.push_str(
            "\nAll interactions will be structured in the following way, \
             with the appropriate values filled in.\n\nInputs will have the following structure:\n\n",
        );
        for field in &signature.inputs {
            let _ = writeln!(system, "{}\n{{{}}}\n", marker(&field.name), field.name);
        }
        system.push_str("Outputs will be a JSON object with the following fields.\n\n{\n");
        let keys: Vec<String> = signature
            .outputs
            .iter()
            .map(|f| format!("  \"{}\": \"{{{}}}\"", f.name, f.name))
            .collect();
        system.push_str(&keys.join(",\n"));
        system.push_str("\n}\n");
        system.push_str(&objective(signature));

        let mut user = render_inputs(signature, inputs);
        let order: Vec<String> = signature.outputs.iter().map(|f| format!("`{}`", f.name)).collect();
        let _ = write!(
            user,
            "Respond with a JSON object in the following order of fields: {}.",
            order.join(", then ")
        );

        vec![ProviderMessage::system(system), ProviderMessage::user(user)]
    }

    fn parse(&self, signature: &Signature, completion: &str) -> Result<Prediction, SignatureError> {
        let mut object = Self::extract_object(completion)?;
        let mut fields = Map::new();
        for field in &signature.outputs {
            let value = match object.remove(&field.name) {
                Some(Value::Null) | None => missing(field)?,
                Some(value) => {
                    field
                        .kind
                        .conform(value)
                        .map_err(|reason| SignatureError::InvalidOutput {
                            field: field.name.clone(),
                            reason,
                        })?
                }
            };
            fields.insert(field.name.clone(), value);
        }
        Ok(Prediction::new(fields))
    }
}

fn missing(field: &FieldSpec) -> Result<Value, SignatureError> {
    field
        .default
        .clone()
        .ok_or_else(|| SignatureError::MissingOutput {
            field: field.name.clone(),
        })
}
