//! JSON style input.
//!
//! Objects become [`Style`]s (key order is preserved), strings and numbers
//! become primitives, `null` becomes [`StyleValue::Null`]. Booleans and arrays
//! have no meaning in a style and are rejected, as is any top level that is not
//! an object.

use serde_json::{Map, Value};

use crate::css::compiler::StyleError;
use crate::css::model::{Style, StyleValue};

impl Style {
    /// Parse a style from JSON text.
    pub fn from_json_str(input: &str) -> Result<Style, StyleError> {
        let value: Value = serde_json::from_str(input)?;
        Style::try_from(&value)
    }
}

impl TryFrom<&Value> for Style {
    type Error = StyleError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => convert_object(map, &mut Vec::new()),
            other => Err(StyleError::shape(
                "",
                format!("expected a JSON object at the top level, got {}", json_kind(other)),
            )),
        }
    }
}

impl TryFrom<Value> for Style {
    type Error = StyleError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Style::try_from(&value)
    }
}

fn convert(value: &Value, path: &mut Vec<String>) -> Result<StyleValue, StyleError> {
    match value {
        Value::Null => Ok(StyleValue::Null),
        Value::String(s) => Ok(StyleValue::Str(s.clone())),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => StyleValue::Int(i),
            None => StyleValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Value::Object(map) => convert_object(map, path).map(StyleValue::Nested),
        other => Err(StyleError::shape(
            path.join(" / "),
            format!("{} values are not allowed in a style", json_kind(other)),
        )),
    }
}

fn convert_object(map: &Map<String, Value>, path: &mut Vec<String>) -> Result<Style, StyleError> {
    let mut style = Style::new();
    for (key, entry) in map {
        path.push(key.clone());
        let converted = convert(entry, path)?;
        path.pop();
        style.insert(key.clone(), converted);
    }
    Ok(style)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
