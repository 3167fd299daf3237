use crate::processor::ChecklistReport;
use crate::types::{Field, FieldMap};
use anyhow::Result;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Output formats accepted by [`ChecklistReport::render`].
pub const OUTPUT_FORMATS: [&str; 3] = ["report", "fields", "checklist"];

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("invalid JSON document: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object of field values, found {0}")]
    NotAnObject(&'static str),
}

// Flat object of camelCase keys, canonical field order, present fields only
impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldMapVisitor)
    }
}

struct FieldMapVisitor;

impl<'de> Visitor<'de> for FieldMapVisitor {
    type Value = FieldMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object of checklist field values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldMap, A::Error> {
        let mut fields = FieldMap::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            let Ok(field) = key.parse::<Field>() else {
                continue;
            };
            if let Some(value) = scalar_text(&value) {
                fields.set(field, value);
            }
        }
        Ok(fields)
    }
}

/// Strings as-is, numbers and booleans stringified, anything else ignored.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Pretty JSON export of a field map.
pub fn to_json(fields: &FieldMap) -> Result<String, SerializationError> {
    Ok(serde_json::to_string_pretty(fields)?)
}

/// Lenient import: unknown keys, blanks and non-scalar values are dropped.
/// Only malformed JSON or a non-object root is an error.
pub fn from_json(json: &str) -> Result<FieldMap, SerializationError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(SerializationError::NotAnObject(kind(&value)));
    }
    Ok(serde_json::from_value(value)?)
}

impl ChecklistReport {
    pub fn render(&self, format: &str) -> Result<String> {
        let json = match format {
            "fields" => to_json(&self.fields)?,
            "checklist" => serde_json::to_string_pretty(&self.outcomes)?,
            "report" => serde_json::to_string_pretty(self)?,
            other => {
                tracing::warn!(format = other, "unknown output format, writing full report");
                serde_json::to_string_pretty(self)?
            }
        };
        Ok(json)
    }
}
