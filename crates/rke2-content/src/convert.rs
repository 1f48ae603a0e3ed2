//! YAML to canonical JSON conversion
//!
//! Free-form cluster options arrive as YAML (or JSON, which is valid YAML).
//! Config fragments are written as compact JSON with sorted object keys so
//! that identical input always produces byte-identical output.

use serde_json::{Map, Value as JsonValue};
use serde_yaml::Value as YamlValue;

use crate::error::Result;

/// Parse YAML (or JSON) text into a JSON value.
///
/// Blank input is treated as an empty mapping. Mapping keys that are
/// booleans or numbers are stringified; other non-string keys are dropped.
pub fn yaml_to_value(source: &str) -> Result<JsonValue> {
    if source.trim().is_empty() {
        return Ok(JsonValue::Object(Map::new()));
    }

    let yaml: YamlValue = serde_yaml::from_str(source)?;
    Ok(to_json(&yaml))
}

/// Convert YAML (or JSON) text into compact JSON text with sorted keys.
pub fn yaml_to_json(source: &str) -> Result<String> {
    let value = yaml_to_value(source)?;
    Ok(serde_json::to_string(&value)?)
}

/// Best-effort variant of [`yaml_to_json`].
///
/// Conversion failures are logged and yield an empty string, so a broken
/// fragment produces an empty file instead of aborting plan generation.
pub fn canonical_json(source: &str) -> String {
    match yaml_to_json(source) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "Could not convert config fragment to JSON");
            String::new()
        }
    }
}

fn to_json(value: &YamlValue) -> JsonValue {
    match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                JsonValue::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null)
            } else {
                JsonValue::Null
            }
        }
        YamlValue::String(s) => JsonValue::String(s.clone()),
        YamlValue::Sequence(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        YamlValue::Mapping(map) => {
            // serde_json's default Map is ordered by key
            let mut object = Map::new();
            for (key, value) in map {
                if let Some(key) = key_string(key) {
                    object.insert(key, to_json(value));
                }
            }
            JsonValue::Object(object)
        }
        YamlValue::Tagged(tagged) => to_json(&tagged.value),
    }
}

fn key_string(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Tagged(tagged) => key_string(&tagged.value),
        _ => None,
    }
}
