//! Field declarations and value coercion.

use serde_json::Value;

/// The type of a signature field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Str,
    /// `true` / `false`.
    Bool,
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// JSON array whose items are of the inner kind.
    List(Box<FieldKind>),
    /// Any JSON object.
    Json,
}

impl FieldKind {
    /// Shorthand for `List(Str)`.
    pub fn str_list() -> Self {
        FieldKind::List(Box::new(FieldKind::Str))
    }

    /// The type name shown to the model.
    pub fn type_name(&self) -> String {
        match self {
            FieldKind::Str => "str".into(),
            FieldKind::Bool => "bool".into(),
            FieldKind::Int => "int".into(),
            FieldKind::Float => "float".into(),
            FieldKind::List(inner) => format!("list[{}]", inner.type_name()),
            FieldKind::Json => "dict".into(),
        }
    }

    /// Whether a JSON value already has this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::Str, Value::String(_)) => true,
            (FieldKind::Bool, Value::Bool(_)) => true,
            (FieldKind::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldKind::Float, Value::Number(_)) => true,
            (FieldKind::List(inner), Value::Array(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            (FieldKind::Json, Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Convert raw completion text into a value of this kind.
    pub fn coerce(&self, raw: &str) -> Result<Value, String> {
        let text = raw.trim();
        match self {
            FieldKind::Str => Ok(Value::String(text.to_string())),
            FieldKind::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "yes" => Ok(Value::Bool(true)),
                "false" | "no" => Ok(Value::Bool(false)),
                other => Err(format!("expected a bool, got `{other}`")),
            },
            FieldKind::Int => text
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| format!("expected an int: {e}")),
            FieldKind::Float => {
                let f = text
                    .parse::<f64>()
                    .map_err(|e| format!("expected a float: {e}"))?;
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("`{text}` is not a finite number"))
            }
            FieldKind::List(inner) => {
                let body = strip_code_fence(text);
                match serde_json::from_str::<Value>(body) {
                    Ok(value) => self.conform(value),
                    Err(_) if **inner == FieldKind::Str => Ok(bullet_list(body)),
                    Err(e) => Err(format!("expected a JSON array: {e}")),
                }
            }
            FieldKind::Json => {
                let value = serde_json::from_str::<Value>(strip_code_fence(text))
                    .map_err(|e| format!("expected a JSON object: {e}"))?;
                self.conform(value)
            }
        }
    }

    /// Bring an already-parsed JSON value to this kind.
    ///
    /// Strings are coerced from their text; a scalar standing in for a
    /// string field is rendered as JSON text.
    pub fn conform(&self, value: Value) -> Result<Value, String> {
        if self.accepts(&value) {
            return Ok(value);
        }
        match (self, value) {
            (FieldKind::Str, other) => Ok(Value::String(other.to_string())),
            (FieldKind::List(inner), Value::Array(items)) => items
                .into_iter()
                .map(|item| inner.conform(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (_, Value::String(s)) => self.coerce(&s),
            (kind, other) => Err(format!("expected {}, got `{other}`", kind.type_name())),
        }
    }
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip an info string such as ```json
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// One string per non-empty line, with bullet or numbering markers removed.
fn bullet_list(text: &str) -> Value {
    let items = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let line = line
                .trim_start_matches(['-', '*', '•'])
                .trim_start();
            let unnumbered = line.trim_start_matches(|c: char| c.is_ascii_digit());
            let line = if unnumbered.len() < line.len() {
                unnumbered
                    .strip_prefix(['.', ')'])
                    .filter(|rest| rest.starts_with(char::is_whitespace))
                    .map(str::trim_start)
                    .unwrap_or(line)
            } else {
                line
            };
            Value::String(line.to_string())
        })
        .collect();
    Value::Array(items)
}

/// One declared input or output field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name, used as the marker and JSON key.
    pub name: String,
    /// Field type.
    pub kind: FieldKind,
    /// Instruction text shown to the model.
    pub description: String,
    /// Value used when the model omits an output field.
    pub default: Option<Value>,
}

impl FieldSpec {
    /// A field with no description and no default.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            default: None,
        }
    }

    /// Set the description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}
